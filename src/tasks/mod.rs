//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Sweeper: Evicts cold entries while the cache is over its size bound

mod sweeper;

pub(crate) use sweeper::spawn_sweeper;
pub use sweeper::{SweeperHandle, SHUTDOWN_TIMEOUT};
