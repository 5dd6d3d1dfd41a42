//! scache - A small concurrent TTL cache
//!
//! Bounds its size with a probabilistic sampler instead of a fully ordered
//! recency list: a background sweeper repeatedly evicts entries whose last
//! access is at or below the oldest access time in a small random sample.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{configure, Configuration};
pub use error::{CacheError, Result};
pub use tasks::SweeperHandle;
