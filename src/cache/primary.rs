//! Primary Store Module
//!
//! Capacity-bounded hot tier. Values live in a HashMap; which key leaves when
//! the tier is full is decided by a pluggable [`EvictionPolicy`].

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EvictionPolicy};
use crate::error::{CacheError, Result};

// == Primary Store ==
/// Primary-tier storage with policy-driven eviction.
///
/// Every key in `entries` is tracked by `policy` and vice versa.
#[derive(Debug)]
pub struct PrimaryStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Eviction bookkeeping
    policy: Box<dyn EvictionPolicy<K>>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Performance statistics
    stats: CacheStats,
}

impl<K, V> PrimaryStore<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    // == Constructor ==
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize, policy: Box<dyn EvictionPolicy<K>>) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            capacity,
            stats: CacheStats::new(),
        }
    }

    // == Try Get ==
    /// Looks up `key`, counting a hit (and touching the policy) or a miss.
    pub fn try_get(&mut self, key: &K) -> Option<&V> {
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                self.policy.touch(key);
                Some(&entry.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Inserts or overwrites `key`.
    ///
    /// Overwriting never evicts. Inserting a new key into a full store evicts
    /// the policy's victim first and hands it back for the secondary tier.
    ///
    /// # Errors
    /// `CacheError::EmptyEvictionState` when the store is full but holds
    /// nothing to evict (capacity 0).
    pub fn put(&mut self, key: K, entry: CacheEntry<V>) -> Result<Option<(K, V)>> {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            self.policy.touch(&key);
            return Ok(None);
        }

        let evicted = if self.entries.len() >= self.capacity {
            Some(self.evict_one()?)
        } else {
            None
        };

        self.policy.touch(&key);
        self.entries.insert(key, entry);

        Ok(evicted)
    }

    // == Delete ==
    /// Removes `key` from the store and the policy.
    pub fn delete(&mut self, key: &K) -> bool {
        if self.entries.remove(key).is_some() {
            self.policy.forget(key);
            true
        } else {
            false
        }
    }

    // == Delete Expired ==
    /// Removes `key` only if it has expired as of `now`.
    pub fn delete_expired(&mut self, key: &K, now: DateTime<Utc>) -> bool {
        if !self.is_expired(key, now) {
            return false;
        }
        self.delete(key);
        self.stats.record_expiration();
        true
    }

    // == Set Capacity ==
    /// Changes the capacity, evicting down to it first.
    ///
    /// Returns the evicted entries in eviction order; the caller relays them
    /// to the secondary tier.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<Vec<(K, V)>> {
        let excess = self.entries.len().saturating_sub(capacity);
        let mut evicted = Vec::with_capacity(excess);
        for _ in 0..excess {
            evicted.push(self.evict_one()?);
        }
        self.capacity = capacity;
        Ok(evicted)
    }

    // == Expired Keys ==
    /// Keys whose expiry has passed as of `now`.
    pub fn expired_keys(&self, now: DateTime<Utc>) -> Vec<K> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn is_expired(&self, key: &K, now: DateTime<Utc>) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now))
    }

    pub fn entry(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
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

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn policy(&self) -> &dyn EvictionPolicy<K> {
        self.policy.as_ref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Removes the policy's victim from both the policy and the store.
    fn evict_one(&mut self) -> Result<(K, V)> {
        let victim = self
            .policy
            .select_victim()
            .cloned()
            .ok_or(CacheError::EmptyEvictionState)?;
        self.policy.forget(&victim);

        let entry = self.entries.remove(&victim).ok_or_else(|| {
            CacheError::Internal(format!("eviction victim {:?} has no entry", victim))
        })?;

        self.stats.record_eviction();
        debug!(key = ?victim, policy = self.policy.name(), "Evicted from primary tier");

        Ok((victim, entry.value))
    }

    /// Checks capacity and the store/policy bijection.
    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) -> std::result::Result<(), String> {
        if self.entries.len() > self.capacity {
            return Err(format!(
                "{} entries exceed capacity {}",
                self.entries.len(),
                self.capacity
            ));
        }
        if self.policy.len() != self.entries.len() {
            return Err(format!(
                "policy tracks {} keys, store holds {}",
                self.policy.len(),
                self.entries.len()
            ));
        }
        if let Some(key) = self.entries.keys().find(|k| !self.policy.contains(k)) {
            return Err(format!("{:?} is stored but not tracked", key));
        }
        Ok(())
    }
}
