//! Cache Statistics Module
//!
//! Lock-free counters bumped on the hot path, plus a serializable snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counters ==
/// Atomic counters shared by the cache and its sweeper.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    evictions: AtomicU64,
    prune_rounds: AtomicU64,
    clears: AtomicU64,
}

impl StatsCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one sampler round and the entries it removed.
    pub fn record_prune(&self, evicted: usize) {
        self.prune_rounds.fetch_add(1, Ordering::Relaxed);
        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
    }

    pub fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            prune_rounds: self.prune_rounds.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of cache activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Completed `set` calls, including those made by `fetch`
    pub sets: u64,
    /// Entries removed by the sampler
    pub evictions: u64,
    /// Sampler rounds run, manual or by the sweeper
    pub prune_rounds: u64,
    /// Completed `clear` calls
    pub clears: u64,
    /// Entries in the store when the snapshot was taken (expired included)
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsCounters::default().snapshot(0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        assert_eq!(counters.snapshot(0).hit_rate(), 0.75);
    }

    #[test]
    fn test_record_prune() {
        let counters = StatsCounters::default();
        counters.record_prune(3);
        counters.record_prune(0);

        let stats = counters.snapshot(10);
        assert_eq!(stats.prune_rounds, 2);
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.total_entries, 10);
    }

    #[test]
    fn test_stats_serialize() {
        let counters = StatsCounters::default();
        counters.record_set();
        counters.record_clear();

        let json = serde_json::to_value(counters.snapshot(1)).unwrap();
        assert_eq!(json["sets"], 1);
        assert_eq!(json["clears"], 1);
        assert_eq!(json["total_entries"], 1);
    }
}
