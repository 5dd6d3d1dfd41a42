//! Cache Store Module
//!
//! Keyed collection of entries guarded by a single reader/writer lock.
//!
//! Structural changes (insert, batch delete, reset) take the write lock.
//! Lookups and the sampler's scans take the read lock. Per-entry recency is
//! an atomic inside [`CacheEntry`] and never needs the write lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::CacheEntry;

pub(crate) type EntryMap<K, V> = HashMap<K, Arc<CacheEntry<V>>>;

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore<K, V> {
    entries: RwLock<EntryMap<K, V>>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // == Insert ==
    /// Inserts or replaces the entry for `key`.
    ///
    /// Replacing publishes a fresh entry; readers still holding the old Arc
    /// keep seeing the old value.
    pub fn insert(&self, key: K, entry: CacheEntry<V>) {
        self.entries.write().insert(key, Arc::new(entry));
    }

    // == Lookup ==
    /// Returns the entry for `key`. The read lock is released before return.
    pub fn lookup<Q>(&self, key: &Q) -> Option<Arc<CacheEntry<V>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.read().get(key).cloned()
    }

    // == Remove ==
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.write().remove(key).is_some()
    }

    /// Deletes every key in `keys` under one write lock.
    ///
    /// Returns how many were actually present.
    pub fn remove_batch(&self, keys: &[K]) -> usize {
        let mut entries = self.entries.write();
        keys.iter()
            .filter(|key| entries.remove(*key).is_some())
            .count()
    }

    // == Reset ==
    /// Discards all entries, returning how many were dropped.
    pub fn reset(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        *entries = HashMap::new();
        count
    }

    /// Runs `f` over the map while holding the read lock.
    pub(crate) fn with_entries<R>(&self, f: impl FnOnce(&EntryMap<K, V>) -> R) -> R {
        f(&*self.entries.read())
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> Default for CacheStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
