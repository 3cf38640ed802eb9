//! Cache Metrics
//!
//! Operation counters and a point-in-time snapshot of them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by every cache operation
#[derive(Debug, Default)]
pub(crate) struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    removals: AtomicU64,
    expired: AtomicU64,
}

impl CacheMetrics {
    /// Create zeroed counters
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expired(&self, count: usize) {
        self.expired.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Copy the counters out, pairing them with the current entry count
    /// and the sweeper's cycle count
    pub(crate) fn snapshot(&self, entries: usize, sweeps: u64) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            sweeps,
            entries,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    /// Explicit removals that found an entry
    pub removals: u64,
    /// Entries evicted by pruning
    pub expired: u64,
    /// Completed sweeper cycles
    pub sweeps: u64,
    /// Physical entry count, including expired entries not yet pruned
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0.0 when there were none
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }

    /// Get a summary of the statistics
    pub fn summary(&self) -> String {
        format!(
            "Entries: {} | Hits: {} Misses: {} ({:.1}% hit) | Inserts: {} Removals: {} | Expired: {} over {} sweeps",
            self.entries,
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.inserts,
            self.removals,
            self.expired,
            self.sweeps
        )
    }
}
