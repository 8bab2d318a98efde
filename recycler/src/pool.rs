use alloc::vec::Vec;

use crate::RenderKey;
use crate::key::KeyMap;

/// Keys of output slots whose indexes left the engaged set and may be reused.
///
/// All operations are `O(1)`: keys are kept in a dense vector with a side table of positions,
/// and removal swaps the last key into the vacated slot. [`RecyclePool::get_next`] hands out
/// the most recently added key, but callers must not rely on any particular order.
#[derive(Clone, Debug, Default)]
pub struct RecyclePool {
    keys: Vec<RenderKey>,
    positions: KeyMap<RenderKey, usize>,
}

impl RecyclePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &RenderKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Adds a key. Adding a key that is already pooled is a no-op.
    pub fn add(&mut self, key: RenderKey) {
        if self.positions.contains_key(&key) {
            return;
        }
        self.positions.insert(key, self.keys.len());
        self.keys.push(key);
    }

    /// Removes a key if present.
    pub fn remove(&mut self, key: &RenderKey) {
        let Some(pos) = self.positions.remove(key) else {
            return;
        };
        self.keys.swap_remove(pos);
        if let Some(moved) = self.keys.get(pos) {
            self.positions.insert(*moved, pos);
        }
    }

    /// Takes an available key out of the pool.
    pub fn get_next(&mut self) -> Option<RenderKey> {
        let key = self.keys.pop()?;
        self.positions.remove(&key);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.positions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderKey> {
        self.keys.iter()
    }
}
