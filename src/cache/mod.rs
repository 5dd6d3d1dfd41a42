//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and sampled eviction.

mod entry;
mod facade;
pub mod sampler;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use facade::Cache;
pub(crate) use facade::CacheInner;
pub use stats::CacheStats;
pub use store::CacheStore;
