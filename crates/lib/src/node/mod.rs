//! The store tree.
//!
//! Every element of the tree is a [`Node`]: a [`NodeValue`] of one of three
//! shapes plus a [`Meta`] record. Containers hold child nodes, never raw
//! values, so the tag and the runtime shape cannot disagree.
//!
//! # Core Operations
//!
//! - [`Node::from_value`] builds a node (and its whole subtree) from plain data
//! - [`Node::to_value`] parses a node back into plain data
//! - [`resolve`] / [`write`] address nodes by [`StoragePath`](crate::path::StoragePath)
//! - [`flatten`] enumerates a subtree in pre-order
//!
//! ```rust
//! use pathstore::node::{Node, resolve};
//! use pathstore::path;
//! use serde_json::json;
//!
//! let value = json!({"friends": [{"name": "Homer"}]});
//! let root = Node::from_value(&value);
//!
//! let name = resolve(&root, &path!["friends", 0, "name"].to_storage_path()).unwrap();
//! assert_eq!(name.to_value(), json!("Homer"));
//! assert_eq!(root.to_value(), value);
//! ```

use serde_json::{Map, Value};

use crate::{path::Segment, value::ValueShape};

mod flatten;
mod meta;
mod tree;

pub use flatten::{FlatNode, flatten, flatten_at, walk};
pub use meta::{Meta, MetaUpdate, NodeId};
pub use tree::{WriteOptions, resolve, resolve_mut, write};

/// The value held by a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// string, number, boolean or null
    Primitive(Value),
    /// Children in insertion order
    Object(Vec<(String, Node)>),
    /// Ordered children, plus the child identities captured at creation or
    /// reset. The array is structurally dirty when the two sequences differ.
    Array {
        items: Vec<Node>,
        default_field_ids: Vec<NodeId>,
    },
}

impl NodeValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            NodeValue::Primitive(_) => ValueShape::Primitive,
            NodeValue::Object(_) => ValueShape::Object,
            NodeValue::Array { .. } => ValueShape::Array,
        }
    }

    /// An empty container of the shape addressed by `segment`.
    pub(crate) fn empty_container_for(segment: &Segment) -> Self {
        match segment {
            Segment::Index(_) => NodeValue::Array {
                items: Vec::new(),
                default_field_ids: Vec::new(),
            },
            Segment::Key(_) => NodeValue::Object(Vec::new()),
        }
    }
}

/// One element of the store tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) meta: Meta,
    pub(crate) value: NodeValue,
}

impl Node {
    /// Builds a node from plain data.
    ///
    /// Arrays and objects are wrapped recursively; every node in the new
    /// subtree gets a fresh id, and an array records its children's ids as
    /// its default field ids. Each node snapshots its input as the dirty
    /// baseline.
    pub fn from_value(value: &Value) -> Self {
        let node_value = match value {
            Value::Array(elements) => {
                let items: Vec<Node> = elements.iter().map(Node::from_value).collect();
                let default_field_ids = items.iter().map(Node::id).collect();
                NodeValue::Array {
                    items,
                    default_field_ids,
                }
            }
            Value::Object(properties) => NodeValue::Object(
                properties
                    .iter()
                    .map(|(key, child)| (key.clone(), Node::from_value(child)))
                    .collect(),
            ),
            primitive => NodeValue::Primitive(primitive.clone()),
        };

        Self {
            meta: Meta::new(value.clone()),
            value: node_value,
        }
    }

    /// A container synthesized while writing below a missing path.
    pub(crate) fn placeholder(value: NodeValue) -> Self {
        Self {
            meta: Meta::placeholder(),
            value,
        }
    }

    /// Parses this node back into plain data.
    pub fn to_value(&self) -> Value {
        match &self.value {
            NodeValue::Primitive(value) => value.clone(),
            NodeValue::Object(children) => Value::Object(
                children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.to_value()))
                    .collect::<Map<String, Value>>(),
            ),
            NodeValue::Array { items, .. } => {
                Value::Array(items.iter().map(Node::to_value).collect())
            }
        }
    }

    pub fn id(&self) -> NodeId {
        self.meta.id
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    pub fn shape(&self) -> ValueShape {
        self.value.shape()
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value, NodeValue::Array { .. })
    }

    /// Returns the array children, or `None` for other shapes.
    pub fn items(&self) -> Option<&[Node]> {
        match &self.value {
            NodeValue::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Ids of the current array children, in order.
    pub fn field_ids(&self) -> Option<Vec<NodeId>> {
        self.items()
            .map(|items| items.iter().map(Node::id).collect())
    }

    /// Returns the direct child addressed by `segment`.
    pub fn child(&self, segment: &Segment) -> Option<&Node> {
        match (&self.value, segment) {
            (NodeValue::Object(children), Segment::Key(key)) => children
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, child)| child),
            (NodeValue::Array { items, .. }, Segment::Index(index)) => items.get(*index),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, segment: &Segment) -> Option<&mut Node> {
        match (&mut self.value, segment) {
            (NodeValue::Object(children), Segment::Key(key)) => children
                .iter_mut()
                .find(|(name, _)| name == key)
                .map(|(_, child)| child),
            (NodeValue::Array { items, .. }, Segment::Index(index)) => items.get_mut(*index),
            _ => None,
        }
    }

    /// Returns true if writing `value` here would change the node.
    ///
    /// Only primitive-to-primitive writes can be unchanged; a structural
    /// value on either side always counts as a change.
    pub fn differs_from(&self, value: &Value) -> bool {
        match &self.value {
            NodeValue::Primitive(current) if ValueShape::of(value).is_primitive() => {
                !crate::value::values_equal(current, value)
            }
            _ => true,
        }
    }

    /// Replaces this node's value in place, keeping its metadata and id.
    ///
    /// A structural value is rebuilt through [`Node::from_value`], so every
    /// descendant gets a new id. An array keeps the default field ids of the
    /// previous array value, if there was one.
    pub(crate) fn replace_value(&mut self, value: &Value) {
        if ValueShape::of(value).is_primitive() {
            self.value = NodeValue::Primitive(value.clone());
            return;
        }

        let carried_ids = match &mut self.value {
            NodeValue::Array {
                default_field_ids, ..
            } => std::mem::take(default_field_ids),
            _ => Vec::new(),
        };

        self.value = match Node::from_value(value).value {
            NodeValue::Array { items, .. } => NodeValue::Array {
                items,
                default_field_ids: carried_ids,
            },
            rebuilt => rebuilt,
        };
    }

    /// Captures the current value as the defaults of a synthesized container.
    pub(crate) fn establish(&mut self) {
        if self.meta.established {
            return;
        }
        self.meta.default_value = self.to_value();
        if let NodeValue::Array {
            items,
            default_field_ids,
        } = &mut self.value
        {
            *default_field_ids = items.iter().map(Node::id).collect();
        }
        self.meta.established = true;
    }
}
