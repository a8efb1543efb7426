//! LRU Policy Module
//!
//! Implements Least Recently Used tracking for primary-tier eviction.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::EvictionPolicy;
use crate::cache::list::{KeyList, NodeId};

// == LRU Policy ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a linked list where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// The index maps each key to its list node, so every operation is O(1).
#[derive(Debug)]
pub struct LruPolicy<K> {
    /// Order of keys by access time
    order: KeyList<K>,
    /// Key to list node
    index: HashMap<K, NodeId>,
}

impl<K> Default for LruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new empty LRU policy.
    pub fn new() -> Self {
        Self {
            order: KeyList::new(),
            index: HashMap::new(),
        }
    }

    // == Peek Newest ==
    /// Returns the most recently used key.
    pub fn peek_newest(&self) -> Option<&K> {
        self.order.front()
    }
}

impl<K> EvictionPolicy<K> for LruPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send,
{
    // == Touch ==
    /// Marks a key as recently used (moves it to the front, inserting if new).
    fn touch(&mut self, key: &K) {
        match self.index.get(key) {
            Some(&node) => {
                self.order.move_to_front(node);
            }
            None => {
                let node = self.order.push_front(key.clone());
                self.index.insert(key.clone(), node);
            }
        }
    }

    // == Select Victim ==
    /// Returns the least recently used key.
    fn select_victim(&self) -> Option<&K> {
        self.order.back()
    }

    // == Forget ==
    fn forget(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(node) => {
                self.order.remove(node);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.order.iter().cloned().collect();
        keys.reverse();
        keys
    }

    fn name(&self) -> &'static str {
        "lru"
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn victim(lru: &LruPolicy<String>) -> Option<&str> {
        lru.select_victim().map(String::as_str)
    }

    fn evict(lru: &mut LruPolicy<String>) -> Option<String> {
        let key = lru.select_victim().cloned()?;
        lru.forget(&key);
        Some(key)
    }

    fn touch(lru: &mut LruPolicy<String>, key: &str) {
        lru.touch(&key.to_string());
    }

    #[test]
    fn test_lru_new() {
        let lru: LruPolicy<String> = LruPolicy::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.select_victim(), None);
    }

    #[test]
    fn test_lru_touch_new_key() {
        let mut lru = LruPolicy::new();

        touch(&mut lru, "key1");
        touch(&mut lru, "key2");
        touch(&mut lru, "key3");

        assert_eq!(lru.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(victim(&lru), Some("key1"));
        assert_eq!(lru.peek_newest().map(String::as_str), Some("key3"));
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruPolicy::new();

        touch(&mut lru, "key1");
        touch(&mut lru, "key2");
        touch(&mut lru, "key3");
        touch(&mut lru, "key1");

        assert_eq!(lru.len(), 3);
        assert_eq!(victim(&lru), Some("key2"));
    }

    #[test]
    fn test_lru_select_victim_does_not_forget() {
        let mut lru = LruPolicy::new();
        touch(&mut lru, "key1");

        assert_eq!(victim(&lru), Some("key1"));
        assert_eq!(victim(&lru), Some("key1"));
        assert!(lru.contains(&"key1".to_string()));
    }

    #[test]
    fn test_lru_forget() {
        let mut lru = LruPolicy::new();

        touch(&mut lru, "key1");
        touch(&mut lru, "key2");
        touch(&mut lru, "key3");

        assert!(lru.forget(&"key2".to_string()));

        assert_eq!(lru.len(), 2);
        assert!(!lru.contains(&"key2".to_string()));
        assert!(lru.contains(&"key1".to_string()));
        assert!(lru.contains(&"key3".to_string()));
    }

    #[test]
    fn test_lru_forget_nonexistent_key() {
        let mut lru = LruPolicy::new();

        touch(&mut lru, "key1");
        touch(&mut lru, "key2");

        assert!(!lru.forget(&"nonexistent".to_string()));
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruPolicy::new();

        touch(&mut lru, "a");
        touch(&mut lru, "b");
        touch(&mut lru, "c");
        touch(&mut lru, "a");
        touch(&mut lru, "c");
        touch(&mut lru, "b");

        // front=[b, c, a]=back
        assert_eq!(lru.keys(), vec!["a", "c", "b"]);
        assert_eq!(evict(&mut lru).as_deref(), Some("a"));
        assert_eq!(evict(&mut lru).as_deref(), Some("c"));
        assert_eq!(evict(&mut lru).as_deref(), Some("b"));
        assert_eq!(evict(&mut lru), None);
    }

    #[test]
    fn test_lru_touch_same_key_multiple_times() {
        let mut lru = LruPolicy::new();

        touch(&mut lru, "key1");
        touch(&mut lru, "key1");
        touch(&mut lru, "key1");

        assert_eq!(lru.len(), 1);
        assert_eq!(evict(&mut lru).as_deref(), Some("key1"));
        assert!(lru.is_empty());
    }
}
