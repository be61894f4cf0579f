//! Store Module
//!
//! The durable key-value collaborator behind the cache.
//!
//! # Backends
//! - `PostgresStore`: `kv_store` table behind a deadpool connection pool
//! - `MemoryStore`: in-process map, used for tests and local runs

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use postgres::{DbConfig, PostgresStore};

/// Durable key-value store consumed by the coordinator.
///
/// Implementations serialize their own internal state; each call is
/// independently consistent and no transaction spans calls.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value for `key`, or None if no record exists.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert the record, overwriting any existing value for `key`.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the record. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
