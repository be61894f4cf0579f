//! kvcache - A key-value service fronting PostgreSQL with a bounded cache
//!
//! Reads go cache-aside, writes go through to the store before the cache,
//! and deletes invalidate the cache after the store confirms.

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod loadgen;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use coordinator::Coordinator;
pub use tasks::spawn_stats_reporter;
