//! Tiered Cache - A two-tier in-memory key/value cache
//!
//! A capacity-bounded primary tier with LRU or LFU eviction spills into an
//! unbounded secondary tier, while a background sweeper purges expired entries.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, EvictionPolicy, PolicyKind, Tier, TieredCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::{spawn_expiry_sweeper, SweeperHandle};
