//! Eviction Sampler Module
//!
//! Approximate-LRU victim selection. Instead of keeping keys ordered by
//! recency, each round samples roughly `width` entries, takes the oldest
//! access time seen in the sample as a threshold, and evicts up to `width`
//! entries at or below it.
//!
//! Cost per round is two read passes plus one batch delete. Since the
//! threshold is the minimum of a small uniform sample, it sits near the cold
//! end of the access-time distribution, so victims skew toward entries that
//! have not been read for a long time.

use std::hash::Hash;

use rand::Rng;

use crate::cache::CacheStore;

// == Prune ==
/// Runs one sampling round against `store` and returns the number of
/// entries removed (never more than `width`).
///
/// Each entry is included in the sample by an independent draw from
/// `[0, n)` that must land at or below `width`, stopping once `width`
/// entries were collected. An empty store or an empty sample is a no-op.
pub fn prune<K, V, R>(store: &CacheStore<K, V>, width: usize, rng: &mut R) -> usize
where
    K: Eq + Hash + Clone,
    R: Rng,
{
    if width == 0 {
        return 0;
    }

    let Some(target) = sample_threshold(store, width, rng) else {
        return 0;
    };

    let victims: Vec<K> = store.with_entries(|entries| {
        entries
            .iter()
            .filter(|(_, entry)| entry.last_accessed() <= target)
            .map(|(key, _)| key.clone())
            .take(width)
            .collect()
    });

    if victims.is_empty() {
        return 0;
    }
    store.remove_batch(&victims)
}

/// Sampling pass: oldest access time among the sampled entries.
fn sample_threshold<K, V, R>(store: &CacheStore<K, V>, width: usize, rng: &mut R) -> Option<i64>
where
    K: Eq + Hash,
    R: Rng,
{
    let mut times: Vec<i64> = store.with_entries(|entries| {
        let n = entries.len();
        if n == 0 {
            return Vec::new();
        }
        let mut times = Vec::with_capacity(width.min(n));
        for entry in entries.values() {
            if rng.gen_range(0..n) > width {
                continue;
            }
            times.push(entry.last_accessed());
            if times.len() == width {
                break;
            }
        }
        times
    });

    times.sort_unstable();
    times.first().copied()
}
