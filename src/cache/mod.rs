//! Cache Module
//!
//! Two-tier caching: a capacity-bounded primary tier with LRU or LFU
//! eviction, spilling into an unbounded secondary tier.

mod entry;
mod list;
mod policy;
mod primary;
mod secondary;
mod stats;
mod tiered;


// Re-export public types
pub use entry::CacheEntry;
pub use policy::{EvictionPolicy, LfuPolicy, LruPolicy, PolicyKind};
pub use primary::PrimaryStore;
pub use secondary::SecondaryStore;
pub use stats::CacheStats;
pub use tiered::{Tier, TieredCache};
