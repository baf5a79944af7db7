//! Pre-order enumeration of a subtree.

use std::fmt;

use super::{Node, NodeValue};
use crate::path::Path;

/// One entry of a flattened tree: a node together with where it lives.
///
/// This is also the payload of the `"value"`, `"meta"` and `"errors"` topics
/// and the element type of a validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    pub display_path: String,
    pub path: Path,
    pub node: Node,
}

impl FlatNode {
    pub fn new(path: Path, node: Node) -> Self {
        Self {
            display_path: path.to_display_path(),
            path,
            node,
        }
    }
}

impl fmt::Display for FlatNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_path.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.display_path)
        }
    }
}

/// Visits `node` and every descendant, parent before children.
///
/// `base` is the path of `node` itself. Object children are visited in
/// insertion order, array children by index.
pub fn walk<F>(node: &Node, base: &Path, visit: &mut F)
where
    F: FnMut(&Path, &Node),
{
    visit(base, node);
    match &node.value {
        NodeValue::Primitive(_) => {}
        NodeValue::Object(children) => {
            for (key, child) in children {
                walk(child, &base.child(key), visit);
            }
        }
        NodeValue::Array { items, .. } => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &base.child(index), visit);
            }
        }
    }
}

/// Flattens the tree rooted at `node`, starting with the root itself.
pub fn flatten(node: &Node) -> Vec<FlatNode> {
    flatten_at(node, Path::new())
}

/// Flattens a subtree whose root lives at `base`.
pub fn flatten_at(node: &Node, base: Path) -> Vec<FlatNode> {
    let mut entries = Vec::new();
    walk(node, &base, &mut |path, node| {
        entries.push(FlatNode::new(path.clone(), node.clone()));
    });
    entries
}
