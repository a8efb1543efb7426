//! Tiered Cache Module
//!
//! Orchestrates the primary and secondary tiers behind a single lock.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::{
    CacheEntry, CacheStats, EvictionPolicy, PolicyKind, PrimaryStore, SecondaryStore,
};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Which tier served a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Primary,
    Secondary,
}

#[derive(Debug)]
struct Tiers<K, V> {
    primary: PrimaryStore<K, V>,
    secondary: SecondaryStore<K, V>,
}

// == Tiered Cache ==
/// Thread-safe two-tier cache handle.
///
/// Cloning is cheap and shares the same tiers. Both tiers and the eviction
/// policy sit behind one mutex, so an eviction (remove from primary, insert
/// into secondary) is never observed half done.
pub struct TieredCache<K, V> {
    tiers: Arc<Mutex<Tiers<K, V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> Clone for TieredCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            tiers: Arc::clone(&self.tiers),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K, V> fmt::Debug for TieredCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredCache")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<K, V> TieredCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache using the system clock.
    pub fn new(capacity: usize, policy: PolicyKind) -> Self {
        Self::with_clock(capacity, policy, Arc::new(SystemClock))
    }

    /// Creates a cache whose expiry checks consult `clock`.
    pub fn with_clock(capacity: usize, policy: PolicyKind, clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(capacity, policy.build(), clock)
    }

    /// Creates a cache around any eviction policy implementation.
    pub fn with_policy(
        capacity: usize,
        policy: Box<dyn EvictionPolicy<K>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tiers: Arc::new(Mutex::new(Tiers {
                primary: PrimaryStore::new(capacity, policy),
                secondary: SecondaryStore::new(),
            })),
            clock,
        }
    }

    /// Creates a cache from configuration, using the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.capacity, config.policy)
    }

    // == Lookup ==
    /// Retrieves a value and the tier that served it.
    ///
    /// A primary-tier hit updates recency/frequency. Anything else counts a
    /// primary-tier miss, then falls back to the secondary tier. An expired
    /// primary entry is removed and treated as absent.
    pub async fn lookup(&self, key: &K) -> Option<(V, Tier)> {
        let now = self.clock.now();
        let mut tiers = self.tiers.lock().await;

        if tiers.primary.delete_expired(key, now) {
            debug!(key = ?key, "Expired entry removed on read");
        }

        if let Some(value) = tiers.primary.try_get(key) {
            return Some((value.clone(), Tier::Primary));
        }

        tiers
            .secondary
            .try_get(key)
            .map(|value| (value.clone(), Tier::Secondary))
    }

    // == Get ==
    /// Retrieves a value from whichever tier holds it.
    ///
    /// Reads also expire: an expired primary entry found here is removed,
    /// counted in `expirations`, and reported as absent.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.lookup(key).await.map(|(value, _)| value)
    }

    // == Set ==
    /// Stores `value` in the primary tier with an optional expiry instant.
    ///
    /// A full primary tier evicts its victim into the secondary tier. A stale
    /// copy of `key` in the secondary tier is dropped.
    ///
    /// # Errors
    /// `CacheError::EmptyEvictionState` when the primary tier has capacity 0.
    pub async fn set(&self, key: K, value: V, expires_at: Option<DateTime<Utc>>) -> Result<()> {
        let mut tiers = self.tiers.lock().await;
        let Tiers { primary, secondary } = &mut *tiers;

        let evicted = primary.put(key.clone(), CacheEntry::new(value, expires_at))?;
        secondary.delete(&key);

        if let Some((victim, victim_value)) = evicted {
            debug!(key = ?victim, "Moved to secondary tier");
            secondary.put(victim, victim_value);
        }

        Ok(())
    }

    /// Stores `value` expiring `ttl` from now by the cache clock.
    pub async fn set_with_ttl(&self, key: K, value: V, ttl: Duration) -> Result<()> {
        let delta = TimeDelta::from_std(ttl)
            .map_err(|e| CacheError::InvalidTtl(format!("{:?}: {}", ttl, e)))?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(delta)
            .ok_or_else(|| CacheError::InvalidTtl(format!("{:?} overflows the clock", ttl)))?;

        self.set(key, value, Some(expires_at)).await
    }

    // == Remove ==
    /// Removes `key` from whichever tier holds it. Returns whether it existed.
    pub async fn remove(&self, key: &K) -> bool {
        let mut tiers = self.tiers.lock().await;
        tiers.primary.delete(key) || tiers.secondary.delete(key)
    }

    // == Resize ==
    /// Changes the primary-tier capacity.
    ///
    /// Shrinking evicts victims into the secondary tier until the new capacity
    /// is met. Returns how many entries were moved.
    pub async fn resize(&self, new_capacity: usize) -> Result<usize> {
        let mut tiers = self.tiers.lock().await;
        let Tiers { primary, secondary } = &mut *tiers;

        let old_capacity = primary.capacity();
        let evicted = primary.set_capacity(new_capacity)?;
        let moved = evicted.len();
        for (key, value) in evicted {
            secondary.put(key, value);
        }

        info!(
            "Primary tier resized from {} to {} ({} entries moved to secondary)",
            old_capacity, new_capacity, moved
        );
        Ok(moved)
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let tiers = self.tiers.lock().await;
        let mut stats = tiers.primary.stats().clone();
        stats.primary_entries = tiers.primary.len();
        stats.secondary_entries = tiers.secondary.len();
        stats.capacity = tiers.primary.capacity();
        stats
    }

    // == Sweep Expired ==
    /// Runs one expiry sweep cycle over the primary tier.
    ///
    /// Expired keys are snapshotted under the lock, then removed one at a
    /// time, each under its own lock acquisition. A key re-set with a later
    /// expiry in between is left alone. Returns the number removed.
    pub async fn sweep_expired(&self) -> usize {
        let expired = {
            let tiers = self.tiers.lock().await;
            tiers.primary.expired_keys(self.clock.now())
        };

        let mut removed = 0;
        for key in expired {
            if self.expire(key).await {
                removed += 1;
            }
        }
        removed
    }

    async fn expire(&self, key: K) -> bool {
        let now = self.clock.now();
        let mut tiers = self.tiers.lock().await;
        let removed = tiers.primary.delete_expired(&key, now);
        if removed {
            debug!(key = ?key, "Expired entry swept");
        }
        removed
    }

    // == Introspection ==
    /// Reports which tier holds `key` without touching counters or policy state.
    pub async fn tier_of(&self, key: &K) -> Option<Tier> {
        let tiers = self.tiers.lock().await;
        if tiers.primary.contains(key) {
            Some(Tier::Primary)
        } else if tiers.secondary.contains(key) {
            Some(Tier::Secondary)
        } else {
            None
        }
    }

    /// Number of entries in the primary tier.
    pub async fn primary_len(&self) -> usize {
        self.tiers.lock().await.primary.len()
    }

    /// True when neither tier holds anything.
    pub async fn is_empty(&self) -> bool {
        let tiers = self.tiers.lock().await;
        tiers.primary.is_empty() && tiers.secondary.is_empty()
    }

    pub async fn secondary_len(&self) -> usize {
        self.tiers.lock().await.secondary.len()
    }

    pub async fn capacity(&self) -> usize {
        self.tiers.lock().await.primary.capacity()
    }

    /// Primary-tier keys, next victim first.
    pub async fn eviction_order(&self) -> Vec<K> {
        self.tiers.lock().await.primary.policy().keys()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Checks the capacity, bijection and no-duplication invariants.
    #[cfg(test)]
    pub(crate) async fn debug_validate_invariants(&self) -> std::result::Result<(), String> {
        let tiers = self.tiers.lock().await;
        tiers.primary.debug_validate_invariants()?;
        if let Some(key) = tiers.primary.keys().find(|k| tiers.secondary.contains(k)) {
            return Err(format!("{:?} is resident in both tiers", key));
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache(capacity: usize, policy: PolicyKind) -> (TieredCache<String, u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = TieredCache::with_clock(capacity, policy, clock.clone());
        (cache, clock)
    }

    fn key(s: &str) -> String {
        s.to_string()
    }

    #[tokio::test]
    async fn test_lru_scenario_evicts_least_recent() {
        let (cache, _) = cache(3, PolicyKind::Lru);
        cache.set(key("A"), 1, None).await.unwrap();
        cache.set(key("B"), 2, None).await.unwrap();
        cache.set(key("C"), 3, None).await.unwrap();
        assert_eq!(cache.get(&key("A")).await, Some(1));

        cache.set(key("D"), 4, None).await.unwrap();

        assert_eq!(cache.tier_of(&key("B")).await, Some(Tier::Secondary));
        assert_eq!(cache.tier_of(&key("A")).await, Some(Tier::Primary));
        assert_eq!(cache.tier_of(&key("C")).await, Some(Tier::Primary));
        assert_eq!(cache.tier_of(&key("D")).await, Some(Tier::Primary));
        cache.debug_validate_invariants().await.unwrap();
    }

    #[tokio::test]
    async fn test_secondary_hit_counts_primary_miss() {
        let (cache, _) = cache(1, PolicyKind::Lru);
        cache.set(key("A"), 1, None).await.unwrap();
        cache.set(key("B"), 2, None).await.unwrap();

        assert_eq!(cache.lookup(&key("A")).await, Some((1, Tier::Secondary)));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
    }

    #[tokio::test]
    async fn test_set_clears_cold_copy() {
        let (cache, _) = cache(1, PolicyKind::Lru);
        cache.set(key("A"), 1, None).await.unwrap();
        cache.set(key("B"), 2, None).await.unwrap();
        assert_eq!(cache.tier_of(&key("A")).await, Some(Tier::Secondary));

        // Writing A again pulls it back and pushes B out
        cache.set(key("A"), 10, None).await.unwrap();

        assert_eq!(cache.lookup(&key("A")).await, Some((10, Tier::Primary)));
        assert_eq!(cache.tier_of(&key("B")).await, Some(Tier::Secondary));
        assert_eq!(cache.secondary_len().await, 1);
        cache.debug_validate_invariants().await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_checks_both_tiers() {
        let (cache, _) = cache(1, PolicyKind::Lfu);
        cache.set(key("A"), 1, None).await.unwrap();
        cache.set(key("B"), 2, None).await.unwrap();

        assert!(cache.remove(&key("A")).await);
        assert!(cache.remove(&key("B")).await);
        assert!(!cache.remove(&key("B")).await);
        assert!(cache.is_empty().await);
        cache.debug_validate_invariants().await.unwrap();
    }

    #[tokio::test]
    async fn test_size_accessors_agree_across_tiers() {
        let (cache, _) = cache(1, PolicyKind::Lru);
        cache.set(key("A"), 1, None).await.unwrap();
        cache.set(key("B"), 2, None).await.unwrap();
        cache.remove(&key("B")).await;

        // Only the cold copy of A is left
        assert_eq!(cache.primary_len().await, 0);
        assert_eq!(cache.secondary_len().await, 1);
        assert!(!cache.is_empty().await);

        cache.remove(&key("A")).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_capacity_set_is_reported() {
        let (cache, _) = cache(2, PolicyKind::Lru);
        cache.set(key("A"), 1, None).await.unwrap();

        assert_eq!(cache.resize(0).await, Ok(1));
        let result = cache.set(key("B"), 2, None).await;

        assert_eq!(result, Err(CacheError::EmptyEvictionState));
        assert_eq!(cache.tier_of(&key("A")).await, Some(Tier::Secondary));
        assert_eq!(cache.tier_of(&key("B")).await, None);
    }

    #[tokio::test]
    async fn test_lookup_expires_lazily() {
        let (cache, clock) = cache(4, PolicyKind::Lru);
        cache
            .set_with_ttl(key("A"), 1, Duration::from_secs(1))
            .await
            .unwrap();

        clock.advance(Duration::from_millis(1001));

        assert_eq!(cache.get(&key("A")).await, None);
        let stats = cache.stats().await;
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.primary_entries, 0);
        cache.debug_validate_invariants().await.unwrap();
    }

    #[tokio::test]
    async fn test_sweep_skips_rewritten_key() {
        let (cache, clock) = cache(4, PolicyKind::Lru);
        let now = clock.now();
        cache.set(key("A"), 1, Some(now)).await.unwrap();
        cache.set(key("B"), 2, Some(now)).await.unwrap();
        clock.advance(Duration::from_secs(1));

        // A is refreshed, so only B is swept
        cache
            .set_with_ttl(key("A"), 1, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.sweep_expired().await, 1);
        assert_eq!(cache.tier_of(&key("A")).await, Some(Tier::Primary));
        assert_eq!(cache.tier_of(&key("B")).await, None);
    }

    #[tokio::test]
    async fn test_set_with_ttl_overflow() {
        let (cache, _) = cache(4, PolicyKind::Lru);
        let result = cache
            .set_with_ttl(key("A"), 1, Duration::from_secs(u64::MAX))
            .await;
        assert!(matches!(result, Err(CacheError::InvalidTtl(_))));
        assert_eq!(cache.tier_of(&key("A")).await, None);
    }

    #[tokio::test]
    async fn test_eviction_order_reports_policy_view() {
        let (cache, _) = cache(3, PolicyKind::Lfu);
        cache.set(key("A"), 1, None).await.unwrap();
        cache.set(key("B"), 2, None).await.unwrap();
        cache.get(&key("A")).await;

        assert_eq!(cache.eviction_order().await, vec![key("B"), key("A")]);
        assert_eq!(cache.capacity().await, 3);
        assert_eq!(cache.primary_len().await, 2);
    }
}
