//! Cache Statistics Module
//!
//! Tracks how the TTL store has been used, including faults it absorbed.

use serde::Serialize;

// == Cache Stats ==
/// Counters for TTL store activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live payload
    pub hits: u64,
    /// Reads that returned nothing (missing, expired or malformed)
    pub misses: u64,
    /// Entries removed because they had expired
    pub expired: u64,
    /// Records that could not be parsed
    pub malformed: u64,
    /// Saves the storage medium rejected
    pub write_failures: u64,
    /// Records currently persisted across all namespaces
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self, count: u64) {
        self.expired += count;
    }

    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
