//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::cache::PolicyKind;
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the primary tier can hold
    pub capacity: usize,
    /// Eviction policy for the primary tier
    pub policy: PolicyKind,
    /// Expiry sweeper interval in milliseconds
    pub sweep_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Primary tier capacity (default: 1000)
    /// - `EVICTION_POLICY` - `lru` or `lfu` (default: lru)
    /// - `SWEEP_INTERVAL_MS` - Sweeper frequency in milliseconds (default: 1000)
    ///
    /// # Errors
    /// Returns `CacheError::InvalidCapacity` for a negative capacity.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let capacity = match lookup("CACHE_CAPACITY") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(n) if n < 0 => {
                    return Err(CacheError::InvalidCapacity(format!(
                        "CACHE_CAPACITY must not be negative, got {}",
                        n
                    )))
                }
                Ok(n) => usize::try_from(n).unwrap_or(usize::MAX),
                Err(_) => {
                    warn!("Ignoring unparseable CACHE_CAPACITY={:?}", raw);
                    defaults.capacity
                }
            },
            None => defaults.capacity,
        };

        let policy = match lookup("EVICTION_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring unknown EVICTION_POLICY={:?}", raw);
                defaults.policy
            }),
            None => defaults.policy,
        };

        let sweep_interval_ms = match lookup("SWEEP_INTERVAL_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    warn!("Ignoring invalid SWEEP_INTERVAL_MS={:?}", raw);
                    defaults.sweep_interval_ms
                }
            },
            None => defaults.sweep_interval_ms,
        };

        Ok(Self {
            capacity,
            policy,
            sweep_interval_ms,
        })
    }

    /// Returns the sweeper interval as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            policy: PolicyKind::Lru,
            sweep_interval_ms: 1000,
        }
    }
}
