//! Bounded Cache Module
//!
//! Capacity-bounded concurrent map guarded by a reader/writer lock, with
//! hit/miss accounting kept in independent atomics.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use crate::cache::{CacheStats, EvictionQueue, StatsSnapshot};

/// Map and eviction order, always mutated together under the write lock.
#[derive(Debug)]
struct Resident {
    entries: HashMap<String, String>,
    order: EvictionQueue,
}

// == Bounded Cache ==
/// In-memory cache holding at most `capacity` entries.
///
/// `get` takes the shared lock, so concurrent lookups never block each
/// other. `set` and `delete` take the exclusive lock. None of the operations
/// can fail; a poisoned lock is recovered since every critical section
/// leaves the map and queue consistent before it can panic.
#[derive(Debug)]
pub struct BoundedCache {
    resident: RwLock<Resident>,
    stats: CacheStats,
    capacity: usize,
}

impl BoundedCache {
    // == Constructor ==
    /// Creates an empty cache. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            resident: RwLock::new(Resident {
                entries: HashMap::with_capacity(capacity),
                order: EvictionQueue::with_capacity(capacity),
            }),
            stats: CacheStats::new(),
            capacity,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Resident> {
        self.resident.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Resident> {
        self.resident.write().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Returns a copy of the resident value, recording a hit or a miss.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = self.read().entries.get(key).cloned();

        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Set ==
    /// Inserts or overwrites the entry for `key`.
    ///
    /// When the cache is full and `key` is not resident, the oldest inserted
    /// entry is evicted first.
    pub fn set(&self, key: String, value: String) {
        let mut resident = self.write();

        if let Some(resident_value) = resident.entries.get_mut(&key) {
            *resident_value = value;
            return;
        }

        if resident.entries.len() >= self.capacity {
            if let Some(victim) = resident.order.pop_victim() {
                resident.entries.remove(&victim);
                self.stats.record_eviction();
                trace!(key = %victim, "evicted cache entry");
            }
        }

        resident.order.push(&key);
        resident.entries.insert(key, value);
    }

    // == Delete ==
    /// Removes the entry for `key`. Absent keys are ignored.
    pub fn delete(&self, key: &str) {
        let mut resident = self.write();
        if resident.entries.remove(key).is_some() {
            resident.order.remove(key);
        }
    }

    // == Stats ==
    /// Samples the hit/miss/eviction counters without touching the map lock.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns true if `key` is resident. Does not count as a lookup.
    pub fn contains(&self, key: &str) -> bool {
        self.read().entries.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of resident entries.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
