//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, evictions and write counters.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache activity and occupancy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of lookups that found their key
    pub hits: u64,
    /// Number of lookups that missed
    pub misses: u64,
    /// Number of entries evicted by the LRU policy
    pub evictions: u64,
    /// Number of inserts that created a new entry
    pub insertions: u64,
    /// Number of inserts that replaced an existing value
    pub updates: u64,
    /// Number of explicit removals
    pub removals: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current accounted size in bytes
    pub used_bytes: usize,
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
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
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

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    // == Occupancy ==
    /// Fills in the entry count and byte usage at snapshot time.
    pub fn set_occupancy(&mut self, total_entries: usize, used_bytes: usize) {
        self.total_entries = total_entries;
        self.used_bytes = used_bytes;
    }
}
