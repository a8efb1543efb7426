//! Cache Statistics Module
//!
//! Tracks primary-tier performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance metrics.
///
/// The counters only ever grow; the entry counts and capacity describe the
/// cache at snapshot time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Primary-tier lookups that found the key
    pub hits: u64,
    /// Primary-tier lookups that did not (including secondary-tier hits)
    pub misses: u64,
    /// Entries moved from the primary to the secondary tier
    pub evictions: u64,
    /// Entries removed because their expiry passed
    pub expirations: u64,
    /// Current number of entries in the primary tier
    pub primary_entries: usize,
    /// Current number of entries in the secondary tier
    pub secondary_entries: usize,
    /// Configured primary-tier capacity
    pub capacity: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the primary-tier hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }
}
