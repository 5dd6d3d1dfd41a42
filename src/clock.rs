//! Clock Module
//!
//! Time source consulted for expiry and recency. Swappable so tests can
//! drive time deterministically instead of sleeping.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;

/// Supplies the current time as Unix milliseconds.
pub trait Clock: Send + Sync + Debug {
    fn now_ms(&self) -> i64;
}

// == System Clock ==
/// Monotonic clock reporting Unix milliseconds.
///
/// Wall time is read once from `chrono::Utc` at construction; later readings
/// add the elapsed `Instant` time, so the value never goes backwards when the
/// system clock is adjusted.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    base_ms: i64,
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            base_ms: Utc::now().timestamp_millis(),
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        self.base_ms.saturating_add(duration_to_ms(self.started.elapsed()))
    }
}

// == Mock Clock ==
/// Manually driven clock.
#[derive(Debug, Default)]
pub struct MockClock {
    now: AtomicI64,
}

impl MockClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    /// Starts at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now().timestamp_millis())
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(duration_to_ms(by), Ordering::SeqCst);
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Converts a duration to whole milliseconds, saturating at `i64::MAX`.
pub(crate) fn duration_to_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
