//! Sequence edits used by array mutations.
//!
//! These are plain operations over a `Vec`, generic so they can be tested
//! without building nodes. Index arguments are clamped the way splicing a
//! sequence clamps them: an insertion index past the end appends, a removal
//! past the end removes nothing.

/// Moves the element at `from` so that it ends up at `to`.
///
/// The element is taken out first and reinserted using post-removal
/// indexing, so this is not a swap. Out-of-range `from` is a no-op and `to`
/// is clamped to the end.
///
/// ```rust
/// # use pathstore::array::move_item;
/// let mut seq = vec!['a', 'b', 'c', 'd'];
/// move_item(&mut seq, 0, 2);
/// assert_eq!(seq, ['b', 'c', 'a', 'd']);
/// ```
pub fn move_item<T>(seq: &mut Vec<T>, from: usize, to: usize) {
    if from >= seq.len() {
        return;
    }
    let item = seq.remove(from);
    let to = to.min(seq.len());
    seq.insert(to, item);
}

/// Removes up to `count` elements starting at `index`, returning them.
pub fn remove<T>(seq: &mut Vec<T>, index: usize, count: usize) -> Vec<T> {
    if index >= seq.len() {
        return Vec::new();
    }
    let end = index.saturating_add(count).min(seq.len());
    seq.drain(index..end).collect()
}

/// Inserts `items` before `index`, keeping their order.
pub fn insert<T>(seq: &mut Vec<T>, index: usize, items: impl IntoIterator<Item = T>) {
    let index = index.min(seq.len());
    seq.splice(index..index, items);
}

/// Removes `delete_count` elements at `index` and inserts `items` in their
/// place. Returns the removed elements.
pub fn splice<T>(
    seq: &mut Vec<T>,
    index: usize,
    delete_count: usize,
    items: impl IntoIterator<Item = T>,
) -> Vec<T> {
    let start = index.min(seq.len());
    let end = start.saturating_add(delete_count).min(seq.len());
    seq.splice(start..end, items).collect()
}

pub fn append<T>(seq: &mut Vec<T>, items: impl IntoIterator<Item = T>) {
    seq.extend(items);
}

pub fn prepend<T>(seq: &mut Vec<T>, items: impl IntoIterator<Item = T>) {
    insert(seq, 0, items);
}
