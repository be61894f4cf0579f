//! Eviction Queue Module
//!
//! Tracks resident keys in insertion order to pick eviction victims.

use std::collections::VecDeque;

// == Eviction Queue ==
/// Insertion-ordered record of resident keys.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion (next victim)
/// - Back = Newest insertion
///
/// Lookups never reorder the queue, so reads stay on the shared lock.
/// Overwriting a resident key keeps its original position.
#[derive(Debug)]
pub struct EvictionQueue {
    order: VecDeque<String>,
}

impl EvictionQueue {
    /// Creates an empty queue with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
        }
    }

    // == Push ==
    /// Records a newly inserted key. Callers must not push a resident key.
    pub fn push(&mut self, key: &str) {
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Drops a key from the queue, if present.
    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Pop Victim ==
    /// Returns and removes the oldest inserted key.
    ///
    /// Returns None if the queue is empty.
    pub fn pop_victim(&mut self) -> Option<String> {
        self.order.pop_front()
    }
}
