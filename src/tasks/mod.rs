//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside cache traffic.
//!
//! # Tasks
//! - Expiry Sweeper: Removes expired primary-tier entries at a configured interval

mod sweeper;

pub use sweeper::{spawn_expiry_sweeper, SweeperHandle};
