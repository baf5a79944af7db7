//! Array operations on a [`Store`].

use serde_json::Value;

use super::Store;
use crate::{Result, array, node::Node, path::Path};

/// Structural edits on array nodes, obtained from [`Store::array`].
///
/// Every operation fails with
/// [`StoreError::NotAnArray`](super::StoreError::NotAnArray) when the path
/// holds no array. New items are plain values, wrapped into fresh nodes.
/// After the edit the array is dirty exactly when its child ids differ,
/// in order, from the ids captured when it was created or last reset.
///
/// ```rust
/// # use pathstore::{path, Store};
/// # use serde_json::json;
/// let store = Store::new(json!({"list": ["a", "b", "c"]}));
/// store.array().move_item(path!["list"], 0, 2)?;
/// assert_eq!(store.get(path!["list"]), Some(json!(["b", "c", "a"])));
/// assert!(store.is_dirty());
///
/// store.array().move_item(path!["list"], 2, 0)?;
/// assert!(!store.is_dirty());
/// # Ok::<(), pathstore::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArrayOps<'a> {
    store: &'a Store,
}

fn wrap<I, V>(items: I) -> Vec<Node>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    items
        .into_iter()
        .map(|item| Node::from_value(&item.into()))
        .collect()
}

impl<'a> ArrayOps<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Adds `item` at the end.
    pub fn append(&self, path: impl AsRef<Path>, item: impl Into<Value>) -> Result<()> {
        let node = Node::from_value(&item.into());
        self.store
            .mutate_array(path.as_ref(), "append", |items| array::append(items, [node]))
    }

    /// Adds `item` at the start.
    pub fn prepend(&self, path: impl AsRef<Path>, item: impl Into<Value>) -> Result<()> {
        let node = Node::from_value(&item.into());
        self.store
            .mutate_array(path.as_ref(), "prepend", |items| array::prepend(items, [node]))
    }

    /// Inserts `items` before `index`; past the end they are appended.
    pub fn insert<I, V>(&self, path: impl AsRef<Path>, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let nodes = wrap(items);
        self.store
            .mutate_array(path.as_ref(), "insert", |children| {
                array::insert(children, index, nodes)
            })
    }

    /// Removes `delete_count` items at `index` and inserts `items` there.
    pub fn splice<I, V>(
        &self,
        path: impl AsRef<Path>,
        index: usize,
        delete_count: usize,
        items: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let nodes = wrap(items);
        self.store
            .mutate_array(path.as_ref(), "splice", |children| {
                array::splice(children, index, delete_count, nodes);
            })
    }

    /// Removes the item at `index`.
    pub fn remove(&self, path: impl AsRef<Path>, index: usize) -> Result<()> {
        self.remove_many(path, index, 1)
    }

    /// Removes up to `count` items starting at `index`.
    pub fn remove_many(&self, path: impl AsRef<Path>, index: usize, count: usize) -> Result<()> {
        self.store
            .mutate_array(path.as_ref(), "remove", |items| {
                array::remove(items, index, count);
            })
    }

    /// Moves the item at `from` to `to`, indexing after the removal.
    pub fn move_item(&self, path: impl AsRef<Path>, from: usize, to: usize) -> Result<()> {
        self.store
            .mutate_array(path.as_ref(), "move", |items| array::move_item(items, from, to))
    }
}
