//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::clock::duration_to_ms;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Entries are shared as `Arc<CacheEntry<V>>` and never mutated in place
/// except for `accessed_at`. A `touch` may land on an entry that a sweep is
/// concurrently deleting; the write is then simply lost with the entry.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    value: V,
    /// Expiration timestamp (Unix milliseconds)
    expires_at: i64,
    /// Most recent successful read (Unix milliseconds)
    accessed_at: AtomicI64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` after `now`.
    pub fn new(value: V, now: i64, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now.saturating_add(duration_to_ms(ttl)),
            accessed_at: AtomicI64::new(now),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    // == Is Expired ==
    /// An entry is expired once `now` is strictly past its expiry time.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at < now
    }

    // == Recency ==
    pub fn last_accessed(&self) -> i64 {
        self.accessed_at.load(Ordering::Relaxed)
    }

    /// Records a read at `now` without any structural lock.
    pub fn touch(&self, now: i64) {
        self.accessed_at.store(now, Ordering::Relaxed);
    }

    /// Remaining lifetime in milliseconds; zero once expired.
    pub fn ttl_remaining_ms(&self, now: i64) -> u64 {
        u64::try_from(self.expires_at.saturating_sub(now)).unwrap_or(0)
    }
}
