//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! A miss is not an error (`get` returns `None`), and failures from a
//! `fetch` producer are handed back to the caller untouched rather than
//! wrapped in [`CacheError`].

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised while building or tearing down a cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cache constructed outside of a Tokio runtime
    #[error("No Tokio runtime available to host the sweeper task")]
    NoRuntime,

    /// Sweeper task panicked or was aborted while joining
    #[error("Sweeper task failed: {0}")]
    SweeperJoin(String),

    /// Sweeper task did not stop in time
    #[error("Sweeper did not stop within {0:?}")]
    ShutdownTimeout(Duration),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::InvalidConfig("prune frequency must be non-zero".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: prune frequency must be non-zero"
        );

        let err = CacheError::ShutdownTimeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Sweeper did not stop within 5s");
    }
}
