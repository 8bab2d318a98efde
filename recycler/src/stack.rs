use alloc::vec::Vec;

use crate::RenderKey;
use crate::key::KeyMap;

/// The set of output slots a render layer must materialize, keyed by [`RenderKey`].
///
/// Each key maps to exactly one logical index. Slots whose index left the engaged set are kept
/// (their key waits in the recycle pool) until the key is handed to another index, so a render
/// layer may keep such slots mounted offscreen. Entries can point past the current item count
/// after the collection shrinks; renderers should skip those.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStack {
    entries: KeyMap<RenderKey, usize>,
}

impl RenderStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The logical index currently bound to `key`.
    pub fn get(&self, key: &RenderKey) -> Option<usize> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &RenderKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RenderKey, usize)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    /// Returns `(key, index)` pairs sorted by index, skipping indexes `>= item_count`.
    pub fn sorted_by_index(&self, item_count: usize) -> Vec<(RenderKey, usize)> {
        let mut out: Vec<(RenderKey, usize)> =
            self.iter().filter(|&(_, index)| index < item_count).collect();
        out.sort_unstable_by_key(|&(key, index)| (index, key));
        out
    }

    /// Binds `key` to `index`, returning the index it was bound to before.
    pub(crate) fn insert(&mut self, key: RenderKey, index: usize) -> Option<usize> {
        self.entries.insert(key, index)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
