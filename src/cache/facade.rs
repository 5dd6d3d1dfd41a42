//! Cache Façade Module
//!
//! Public `get` / `set` / `fetch` / `clear` operations composed from the
//! store, the clock and the sampler, plus the sweeper that keeps the size
//! bound.

use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::debug;

use crate::cache::stats::StatsCounters;
use crate::cache::{sampler, CacheEntry, CacheStats, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::config::Configuration;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, SweeperHandle};

// == Shared State ==
/// State shared between the façade and its sweeper task.
#[derive(Debug)]
pub(crate) struct CacheInner<K, V> {
    pub(crate) store: CacheStore<K, V>,
    pub(crate) stats: StatsCounters,
    pub(crate) config: Configuration,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<K, V> CacheInner<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn from_parts(
        store: CacheStore<K, V>,
        config: Configuration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            stats: StatsCounters::default(),
            config,
            clock,
        }
    }

    pub(crate) fn over_bound(&self) -> bool {
        self.store.len() > self.config.get_max_items()
    }

    /// One sampler round with the thread-local RNG.
    pub(crate) fn prune_round(&self) -> usize {
        let removed = sampler::prune(
            &self.store,
            self.config.get_sample_width(),
            &mut rand::thread_rng(),
        );
        self.stats.record_prune(removed);
        removed
    }
}

// == Cache ==
/// Concurrent TTL cache with sampled approximate-LRU eviction.
///
/// The size bound is soft: `set` never blocks or fails because the cache is
/// full. A background sweeper wakes every `prune_frequency` and evicts cold
/// entries until `len() <= max_items`.
///
/// Expired entries are not removed when read; they count as misses and stay
/// in the store until the sampler or `clear` removes them.
///
/// ```
/// use std::time::Duration;
/// use scache::{Cache, Configuration};
///
/// # tokio_test::block_on(async {
/// let cache = Cache::new(Configuration::new().max_items(100)).unwrap();
/// cache.set("answer".to_string(), 42, Duration::from_secs(60));
/// assert_eq!(cache.get("answer"), Some(42));
/// # });
/// ```
#[derive(Debug)]
pub struct Cache<K, V> {
    inner: Arc<CacheInner<K, V>>,
    sweeper: SweeperHandle,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache on the wall clock and starts its sweeper.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: Configuration) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(config: Configuration, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let frequency = config.get_prune_frequency();
        let inner = Arc::new(CacheInner::from_parts(CacheStore::new(), config, clock));
        let sweeper = spawn_sweeper(&runtime, Arc::clone(&inner), frequency);

        Ok(Self { inner, sweeper })
    }

    // == Get ==
    /// Returns the value for `key`, or `None` if absent or expired.
    ///
    /// A hit refreshes the entry's access time.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(entry) = self.inner.store.lookup(key) else {
            self.inner.stats.record_miss();
            return None;
        };

        let now = self.inner.clock.now_ms();
        if entry.is_expired(now) {
            self.inner.stats.record_miss();
            return None;
        }

        entry.touch(now);
        self.inner.stats.record_hit();
        Some(entry.value().clone())
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let now = self.inner.clock.now_ms();
        self.inner.store.insert(key, CacheEntry::new(value, now, ttl));
        self.inner.stats.record_set();
    }

    // == Fetch ==
    /// Returns the cached value, or runs `producer` and caches its result.
    ///
    /// No lock is held while `producer` runs, so concurrent misses on the
    /// same key may each call their producer. A failing producer caches
    /// nothing and its error is returned as is.
    pub fn fetch<F, E>(&self, key: K, ttl: Duration, producer: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = producer()?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Async form of [`fetch`](Self::fetch) for producers that await I/O.
    pub async fn fetch_async<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        producer: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = producer().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    // == Delete ==
    /// Removes `key`. Returns true if it was present (expired or not).
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.store.remove(key)
    }

    /// True if `key` holds an unexpired value. Does not refresh recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner
            .store
            .lookup(key)
            .is_some_and(|entry| !entry.is_expired(self.inner.clock.now_ms()))
    }

    // == Clear ==
    /// Discards every entry regardless of expiry.
    pub fn clear(&self) {
        let dropped = self.inner.store.reset();
        self.inner.stats.record_clear();
        debug!(dropped, "Cache cleared");
    }

    // == Eviction ==
    /// Runs a single sampler round now. Returns the number evicted.
    ///
    /// Unlike the sweeper, this runs even when the cache is within bound.
    pub fn prune(&self) -> usize {
        self.inner.prune_round()
    }

    /// Drains the cache back within `max_items` on the calling thread.
    ///
    /// Returns the total number of entries evicted.
    pub fn sweep(&self) -> usize {
        let mut evicted = 0;
        while self.inner.over_bound() {
            evicted += self.inner.prune_round();
        }
        evicted
    }

    // == Introspection ==
    /// Entries currently stored, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.inner.store.len())
    }

    pub fn config(&self) -> &Configuration {
        &self.inner.config
    }

    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    // == Shutdown ==
    /// Stops the sweeper and waits for it to exit.
    ///
    /// The cache stays usable afterwards; only background eviction stops.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.sweeper.shutdown().await
    }
}
