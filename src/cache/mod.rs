//! Cache Module
//!
//! Provides the bounded in-memory cache that fronts the durable store.

mod bounded;
mod eviction;
mod stats;


// Re-export public types
pub use bounded::BoundedCache;
pub use stats::{CacheStats, StatsSnapshot};

use eviction::EvictionQueue;
