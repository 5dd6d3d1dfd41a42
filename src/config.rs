//! Configuration Module
//!
//! Builder-style settings consumed once when a cache is constructed.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

/// Default maximum number of items before the sweeper starts evicting
pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// Default prune frequency (5 minutes)
pub const DEFAULT_PRUNE_FREQUENCY: Duration = Duration::from_secs(5 * 60);

/// Ratio between `max_items` and the derived sample width
const SAMPLE_WIDTH_DIVISOR: usize = 20;

/// Cache configuration parameters.
///
/// Setters are chainable:
///
/// ```
/// use std::time::Duration;
/// use scache::Configuration;
///
/// let config = Configuration::new()
///     .max_items(500)
///     .prune_frequency(Duration::from_secs(30));
/// assert_eq!(config.get_sample_width(), 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Soft bound on the number of entries
    max_items: usize,
    /// Entries examined (and at most evicted) per sampler round
    sample_width: usize,
    /// Interval between sweeper wake-ups
    prune_frequency: Duration,
}

/// Shorthand for [`Configuration::new`].
pub fn configure() -> Configuration {
    Configuration::new()
}

impl Configuration {
    // == Constructor ==
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SCACHE_MAX_ITEMS` - Maximum items (default: 1000)
    /// - `SCACHE_SAMPLE_WIDTH` - Sample width override (default: max / 20)
    /// - `SCACHE_PRUNE_FREQUENCY_MS` - Sweep interval in ms (default: 300000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |name: &str| -> Option<u64> {
            let raw = lookup(name)?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(variable = name, value = %raw, "Ignoring unparsable setting");
                    None
                }
            }
        };

        let mut config = Self::default();
        if let Some(max) = parse("SCACHE_MAX_ITEMS") {
            config = config.max_items(max as usize);
        }
        if let Some(width) = parse("SCACHE_SAMPLE_WIDTH") {
            config = config.sample_width(width as usize);
        }
        if let Some(ms) = parse("SCACHE_PRUNE_FREQUENCY_MS") {
            config = config.prune_frequency(Duration::from_millis(ms));
        }
        config
    }

    /// The maximum amount of items the cache should hold.
    ///
    /// Since pruning is scheduled, the actual number can grow larger between
    /// sweeps. Also re-derives the sample width as `count / 20` (minimum 1).
    pub fn max_items(mut self, count: usize) -> Self {
        self.max_items = count;
        self.sample_width = (count / SAMPLE_WIDTH_DIVISOR).max(1);
        self
    }

    /// Overrides the derived sample width (minimum 1).
    pub fn sample_width(mut self, width: usize) -> Self {
        self.sample_width = width.max(1);
        self
    }

    /// How often the sweeper wakes up to check the size bound.
    pub fn prune_frequency(mut self, frequency: Duration) -> Self {
        self.prune_frequency = frequency;
        self
    }

    pub fn get_max_items(&self) -> usize {
        self.max_items
    }

    pub fn get_sample_width(&self) -> usize {
        self.sample_width
    }

    pub fn get_prune_frequency(&self) -> Duration {
        self.prune_frequency
    }

    /// Checks the settings before a cache is built from them.
    pub fn validate(&self) -> Result<()> {
        if self.prune_frequency.is_zero() {
            return Err(CacheError::InvalidConfig(
                "prune frequency must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            sample_width: DEFAULT_MAX_ITEMS / SAMPLE_WIDTH_DIVISOR,
            prune_frequency: DEFAULT_PRUNE_FREQUENCY,
        }
    }
}
