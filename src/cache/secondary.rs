//! Secondary Store Module
//!
//! Unbounded cold tier that absorbs entries evicted from the primary tier.
//! It has no capacity limit, no eviction and no expiry.

use std::collections::HashMap;
use std::hash::Hash;

// == Secondary Store ==
#[derive(Debug)]
pub struct SecondaryStore<K, V> {
    entries: HashMap<K, V>,
}

impl<K, V> Default for SecondaryStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SecondaryStore<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Stores `value`, overwriting any previous value for `key`.
    pub fn put(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Looks up `key` without any bookkeeping side effects.
    pub fn try_get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }
}
