//! Addressing nodes by storage path.

use serde_json::Value;

use super::{Node, NodeValue};
use crate::path::{Segment, StoragePath};

/// Options for [`write`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// After writing, walk back up to the root and establish every container
    /// that was synthesized by a write and never tagged.
    pub validate_ancestors: bool,
}

impl WriteOptions {
    pub fn validate_ancestors() -> Self {
        Self {
            validate_ancestors: true,
        }
    }
}

/// Resolves the node at `storage`, or `None` if any step is missing.
pub fn resolve<'a>(root: &'a Node, storage: &StoragePath) -> Option<&'a Node> {
    storage
        .selectors()
        .try_fold(root, |current, segment| current.child(segment))
}

/// Mutable variant of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Node, storage: &StoragePath) -> Option<&'a mut Node> {
    storage
        .selectors()
        .try_fold(root, |current, segment| current.child_mut(segment))
}

/// Writes `node` at `storage`, creating intermediate containers as needed.
///
/// A missing intermediate is created as a container matching the segment
/// that addresses into it: an index makes an array, a key makes an object.
/// An existing primitive on the way becomes such a container, keeping its
/// metadata. Writing past the end of an array pads it with `null` leaves.
/// Writing at the root storage path replaces the root.
///
/// Existing containers are never replaced. If an object is addressed by an
/// index, or an array by a key, nothing is written and `false` is returned.
///
/// Synthesized containers start out unestablished: they have an id but no
/// captured defaults. With [`WriteOptions::validate_ancestors`], every
/// unestablished node from the written one up to the root captures its
/// current value as its defaults. Established nodes are never revisited.
pub fn write(root: &mut Node, storage: &StoragePath, node: Node, options: WriteOptions) -> bool {
    let selectors: Vec<&Segment> = storage.selectors().collect();
    let Some((last, parents)) = selectors.split_last() else {
        *root = node;
        return true;
    };

    let mut current = &mut *root;
    for (position, segment) in parents.iter().enumerate() {
        let next = selectors[position + 1];
        let make = || Node::placeholder(NodeValue::empty_container_for(next));
        match slot(current, segment, make) {
            Some(child) => current = child,
            None => return false,
        }
    }
    match slot(current, last, || Node::from_value(&Value::Null)) {
        Some(target) => *target = node,
        None => return false,
    }

    if options.validate_ancestors {
        for depth in (0..=selectors.len()).rev() {
            let mut ancestor = Some(&mut *root);
            for segment in &selectors[..depth] {
                ancestor = ancestor.and_then(|current| current.child_mut(segment));
            }
            if let Some(ancestor) = ancestor {
                ancestor.establish();
            }
        }
    }
    true
}

/// Returns the child slot at `segment`, filling it with `make()` when missing.
///
/// A primitive `parent` is first turned into the container `segment`
/// addresses into. A container of the other shape yields `None`.
fn slot<'a>(
    parent: &'a mut Node,
    segment: &Segment,
    make: impl FnOnce() -> Node,
) -> Option<&'a mut Node> {
    if matches!(parent.value, NodeValue::Primitive(_)) {
        parent.value = NodeValue::empty_container_for(segment);
    }

    match (&mut parent.value, segment) {
        (NodeValue::Object(children), Segment::Key(key)) => {
            let position = match children.iter().position(|(name, _)| name == key) {
                Some(position) => position,
                None => {
                    children.push((key.clone(), make()));
                    children.len() - 1
                }
            };
            children.get_mut(position).map(|(_, child)| child)
        }
        (NodeValue::Array { items, .. }, Segment::Index(index)) => {
            while items.len() < *index {
                items.push(Node::from_value(&Value::Null));
            }
            if items.len() == *index {
                items.push(make());
            }
            items.get_mut(*index)
        }
        _ => None,
    }
}
