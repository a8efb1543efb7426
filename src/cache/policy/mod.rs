//! Eviction Policy Module
//!
//! The eviction strategy seam of the primary tier. A policy only tracks keys
//! and picks victims; it never owns values.

mod lfu;
mod lru;

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::Serialize;

pub use lfu::LfuPolicy;
pub use lru::LruPolicy;

// == Eviction Policy Trait ==
/// Recency/frequency bookkeeping for the keys resident in the primary tier.
pub trait EvictionPolicy<K>: Send + fmt::Debug {
    /// Records an access or insertion of `key`.
    fn touch(&mut self, key: &K);

    /// Returns the key that should be evicted next without forgetting it.
    ///
    /// Returns `None` when no keys are tracked.
    fn select_victim(&self) -> Option<&K>;

    /// Drops all bookkeeping for `key`. Returns whether it was tracked.
    fn forget(&mut self, key: &K) -> bool;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &K) -> bool;

    /// Tracked keys, next victim first.
    fn keys(&self) -> Vec<K>;

    /// Short policy name for logs.
    fn name(&self) -> &'static str;
}

// == Policy Kind ==
/// Built-in policies selectable at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Least recently used
    Lru,
    /// Least frequently used, oldest first within a frequency
    Lfu,
}

impl PolicyKind {
    /// Creates an empty policy of this kind.
    pub fn build<K>(self) -> Box<dyn EvictionPolicy<K>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    {
        match self {
            PolicyKind::Lru => Box::new(LruPolicy::new()),
            PolicyKind::Lfu => Box::new(LfuPolicy::new()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Lru => f.write_str("lru"),
            PolicyKind::Lfu => f.write_str("lfu"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "lfu" => Ok(PolicyKind::Lfu),
            other => Err(format!("unknown eviction policy: {}", other)),
        }
    }
}
