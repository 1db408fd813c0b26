//! Cache Statistics Module
//!
//! Tracks store traffic: reads, inserts, deletes, rejections and payload bytes.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful reads
    pub hits: u64,
    /// Number of reads of unknown ids
    pub misses: u64,
    /// Number of records inserted
    pub inserts: u64,
    /// Number of records deleted
    pub deletes: u64,
    /// Number of inserts rejected because the id was taken
    pub duplicate_rejections: u64,
    /// Number of operations that missed their deadline
    pub timeouts: u64,
    /// Payload bytes accepted by inserts
    pub bytes_written: u64,
    /// Payload bytes returned by reads
    pub bytes_read: u64,
    /// Current number of records in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the read hit rate.
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

    pub fn record_hit(&mut self, bytes: usize) {
        self.hits += 1;
        self.bytes_read += bytes as u64;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_insert(&mut self, bytes: usize) {
        self.inserts += 1;
        self.bytes_written += bytes as u64;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_duplicate(&mut self) {
        self.duplicate_rejections += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
