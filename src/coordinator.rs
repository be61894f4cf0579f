//! Consistency Coordinator
//!
//! Cache-aside reads, write-through writes and invalidate-on-delete, composed
//! from the bounded cache and a durable store.
//!
//! Every durable operation completes before the matching cache mutation, so
//! the cache never holds a value the store has not accepted. There is no
//! per-key serialization across the store call: a read that misses can race
//! a concurrent write or remove of the same key and refill the cache with the
//! value it fetched, leaving a stale entry until the next write, remove or
//! eviction of that key.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::BoundedCache;
use crate::error::{KvError, Result};
use crate::store::KvStore;

/// Shared handle over the cache and the store. Cloning is cheap.
#[derive(Clone)]
pub struct Coordinator {
    cache: Arc<BoundedCache>,
    store: Arc<dyn KvStore>,
}

impl Coordinator {
    pub fn new(cache: Arc<BoundedCache>, store: Arc<dyn KvStore>) -> Self {
        Self { cache, store }
    }

    pub fn cache(&self) -> &Arc<BoundedCache> {
        &self.cache
    }

    // == Read ==
    /// Returns the value for `key`, filling the cache on a miss.
    ///
    /// A store failure or a missing record leaves the cache untouched.
    pub async fn read(&self, key: &str) -> Result<String> {
        if let Some(value) = self.cache.get(key) {
            debug!(key, "cache hit");
            return Ok(value);
        }

        debug!(key, "cache miss");
        let value = self.store.get(key).await.map_err(|err| {
            warn!(key, error = %err, "store read failed");
            KvError::from(err)
        })?;

        match value {
            Some(value) => {
                self.cache.set(key.to_string(), value.clone());
                Ok(value)
            }
            None => Err(KvError::NotFound(key.to_string())),
        }
    }

    // == Write ==
    /// Upserts `key` in the store, then caches the value.
    pub async fn write(&self, key: &str, value: String) -> Result<()> {
        self.store.put(key, &value).await.map_err(|err| {
            warn!(key, error = %err, "store write failed");
            KvError::from(err)
        })?;

        self.cache.set(key.to_string(), value);
        Ok(())
    }

    // == Remove ==
    /// Deletes `key` from the store, then invalidates any cached copy.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.store.delete(key).await.map_err(|err| {
            warn!(key, error = %err, "store delete failed");
            KvError::from(err)
        })?;

        self.cache.delete(key);
        Ok(())
    }
}
