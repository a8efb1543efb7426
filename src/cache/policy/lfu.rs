//! LFU Policy Module
//!
//! Least Frequently Used tracking with frequency buckets.
//!
//! ```text
//!   min_freq = 1
//!   freq=1: front ─► [b] ◄──► [d] ◄── back     (b is the next victim)
//!      │ next ▲ prev
//!   freq=3: front ─► [a] ◄── back
//! ```
//!
//! Each bucket keeps keys in the order they reached that frequency, so the
//! front of the minimum bucket is the least frequently used key, oldest first.
//! Non-empty buckets are chained in ascending frequency order, so dropping
//! the minimum bucket advances `min_freq` to its successor without a scan.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::EvictionPolicy;
use crate::cache::list::{KeyList, NodeId};

#[derive(Debug, Clone, Copy)]
struct Slot {
    freq: u64,
    node: NodeId,
}

/// Keys sharing one frequency, linked to the neighbouring non-empty buckets.
///
/// Frequencies start at 1, so 0 marks "no neighbour".
#[derive(Debug)]
struct Bucket<K> {
    keys: KeyList<K>,
    prev: u64,
    next: u64,
}

// == LFU Policy ==
#[derive(Debug)]
pub struct LfuPolicy<K> {
    /// Key to its frequency and node in that frequency's bucket
    index: HashMap<K, Slot>,
    /// Frequency to keys at that frequency, oldest at the front
    buckets: HashMap<u64, Bucket<K>>,
    /// Smallest frequency with a non-empty bucket, 0 when empty
    min_freq: u64,
}

impl<K> Default for LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new empty LFU policy.
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            buckets: HashMap::new(),
            min_freq: 0,
        }
    }

    /// Current access count of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|slot| slot.freq)
    }

    /// Smallest frequency in use, `None` when nothing is tracked.
    pub fn min_frequency(&self) -> Option<u64> {
        (self.min_freq != 0).then_some(self.min_freq)
    }

    /// Creates an empty bucket for `freq` directly after bucket `after`
    /// (0 = at the head of the chain). No-op if the bucket exists.
    fn ensure_bucket(&mut self, freq: u64, after: u64) {
        if self.buckets.contains_key(&freq) {
            return;
        }
        let next = match after {
            0 => self.min_freq,
            _ => self.buckets.get(&after).map_or(0, |bucket| bucket.next),
        };
        match self.buckets.get_mut(&after) {
            Some(prev) => prev.next = freq,
            None => self.min_freq = freq,
        }
        if let Some(next) = self.buckets.get_mut(&next) {
            next.prev = freq;
        }
        self.buckets.insert(
            freq,
            Bucket {
                keys: KeyList::new(),
                prev: after,
                next,
            },
        );
    }

    /// Unlinks `slot` from its bucket, splicing the bucket out of the chain
    /// if it empties. `min_freq` follows the chain.
    fn unlink(&mut self, slot: Slot) {
        let Some(bucket) = self.buckets.get_mut(&slot.freq) else {
            return;
        };
        bucket.keys.remove(slot.node);
        if !bucket.keys.is_empty() {
            return;
        }
        let (prev, next) = (bucket.prev, bucket.next);
        self.buckets.remove(&slot.freq);
        match self.buckets.get_mut(&prev) {
            Some(bucket) => bucket.next = next,
            None => self.min_freq = next,
        }
        if let Some(bucket) = self.buckets.get_mut(&next) {
            bucket.prev = prev;
        }
    }

    /// Appends `key` to the bucket for `freq`, which must already exist.
    fn link(&mut self, key: K, freq: u64) -> Option<Slot> {
        let node = self.buckets.get_mut(&freq)?.keys.push_back(key);
        Some(Slot { freq, node })
    }

    /// Walks the bucket chain from the minimum frequency upwards.
    fn chain(&self) -> impl Iterator<Item = &Bucket<K>> + '_ {
        std::iter::successors(self.buckets.get(&self.min_freq), move |bucket| {
            self.buckets.get(&bucket.next)
        })
    }
}

impl<K> EvictionPolicy<K> for LfuPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send,
{
    // == Touch ==
    /// Bumps the key's frequency, or starts a new key at frequency 1.
    fn touch(&mut self, key: &K) {
        let (freq, after) = match self.index.get(key).copied() {
            Some(slot) => (slot.freq + 1, slot.freq),
            None => (1, 0),
        };
        // The target bucket goes in while the old one still anchors the chain
        self.ensure_bucket(freq, after);
        if let Some(old) = self.index.get(key).copied() {
            self.unlink(old);
        }
        if let Some(slot) = self.link(key.clone(), freq) {
            self.index.insert(key.clone(), slot);
        }
    }

    // == Select Victim ==
    /// Returns the oldest key of the minimum-frequency bucket.
    fn select_victim(&self) -> Option<&K> {
        self.buckets.get(&self.min_freq)?.keys.front()
    }

    // == Forget ==
    fn forget(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.unlink(slot);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn keys(&self) -> Vec<K> {
        self.chain()
            .flat_map(|bucket| bucket.keys.iter().cloned())
            .collect()
    }

    fn name(&self) -> &'static str {
        "lfu"
    }
}
