//! Cache Entry Module
//!
//! Defines the structure for individual primary-tier entries with expiry support.

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A stored value plus its expiry metadata.
///
/// Expiry lives here rather than in the key, so re-setting a key with a
/// different expiry replaces the entry instead of creating a second one.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// An entry is expired only when `now` is strictly after its expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds as of `now`, or None if no
    /// expiration is set. Saturates at zero once expired.
    pub fn ttl_remaining_ms(&self, now: DateTime<Utc>) -> Option<u64> {
        self.expires_at.map(|expires| {
            let remaining = (expires - now).num_milliseconds();
            u64::try_from(remaining).unwrap_or(0)
        })
    }
}
