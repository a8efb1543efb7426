//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror. A missing key is not an
//! error: lookups return `Option` and removals return `bool`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the tiered cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A victim was required but the eviction policy tracks no keys
    #[error("Eviction policy is empty: nothing to evict")]
    EmptyEvictionState,

    /// A capacity that cannot be honored
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// A TTL that cannot be turned into a wall-clock expiry
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Store and policy bookkeeping disagree
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for the tiered cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::EmptyEvictionState.to_string(),
            "Eviction policy is empty: nothing to evict"
        );
        assert_eq!(
            CacheError::InvalidCapacity("-1".to_string()).to_string(),
            "Invalid capacity: -1"
        );
        assert_eq!(
            CacheError::InvalidTtl("overflow".to_string()).to_string(),
            "Invalid TTL: overflow"
        );
    }
}
