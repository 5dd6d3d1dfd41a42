//! Integration Tests for the Cache
//!
//! Exercises the public API end to end: expiry on a mock clock, fetch
//! semantics, concurrent access and the background sweeper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use scache::{configure, Cache, CacheError, MockClock};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn quiet_cache(max_items: usize) -> (Cache<String, usize>, Arc<MockClock>) {
    let clock = Arc::new(MockClock::new(1_700_000_000_000));
    let config = configure()
        .max_items(max_items)
        .prune_frequency(Duration::from_secs(3600));
    let cache = Cache::with_clock(config, clock.clone()).unwrap();
    (cache, clock)
}

// == Basic Operations ==

#[tokio::test]
async fn test_expiry_follows_clock() {
    let (cache, clock) = quiet_cache(1000);
    cache.set("k".to_string(), 1, Duration::from_secs(10));

    clock.advance(Duration::from_secs(9));
    assert_eq!(cache.get("k"), Some(1));

    clock.advance(Duration::from_secs(2));
    assert_eq!(cache.get("k"), None);
}

#[tokio::test]
async fn test_fetch_with_anyhow_producer() {
    let (cache, _) = quiet_cache(1000);

    let err = cache
        .fetch("a".to_string(), Duration::from_secs(60), || {
            Err(anyhow!("upstream unavailable"))
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "upstream unavailable");
    assert_eq!(cache.get("a"), None);

    let value = cache
        .fetch("a".to_string(), Duration::from_secs(60), || Ok::<_, anyhow::Error>(9))
        .unwrap();
    assert_eq!(value, 9);
    assert_eq!(cache.get("a"), Some(9));
}

#[test]
fn test_construction_needs_runtime() {
    let result = Cache::<String, usize>::new(configure());
    assert!(matches!(result, Err(CacheError::NoRuntime)));

    // Inside a runtime the same call succeeds
    tokio_test::block_on(async {
        let cache = Cache::<String, usize>::new(configure()).unwrap();
        assert!(cache.is_empty());
    });
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_readers_and_writers() {
    let (cache, _) = quiet_cache(100_000);
    let cache = Arc::new(cache);

    thread::scope(|scope| {
        for t in 0..8usize {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..500usize {
                    let key = format!("t{}-{}", t, i);
                    cache.set(key.clone(), t * 1000 + i, Duration::from_secs(60));
                    assert_eq!(cache.get(&key), Some(t * 1000 + i));
                    // read another thread's keys; either state is valid
                    let _ = cache.get(&format!("t{}-{}", (t + 1) % 8, i));
                }
            });
        }
    });

    assert_eq!(cache.len(), 8 * 500);
    assert_eq!(cache.stats().sets, 8 * 500);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_fetch_may_run_producer_per_caller() {
    let (cache, _) = quiet_cache(1000);
    let cache = Arc::new(cache);
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(4));

    let results: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                scope.spawn(move || {
                    barrier.wait();
                    cache
                        .fetch("shared".to_string(), Duration::from_secs(60), || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, String>(77)
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|v| *v == 77));
    let calls = calls.load(Ordering::SeqCst);
    assert!((1..=4).contains(&calls), "producer ran {} times", calls);
    assert_eq!(cache.get("shared"), Some(77));
}

// == Sweeper ==

#[tokio::test]
async fn test_background_sweeper_enforces_bound() {
    init_tracing();
    let config = configure()
        .max_items(50)
        .prune_frequency(Duration::from_millis(25));
    let mut cache: Cache<String, usize> = Cache::new(config).unwrap();

    for i in 0..300 {
        cache.set(format!("key{}", i), i, Duration::from_secs(60));
    }
    assert_eq!(cache.len(), 300);

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(cache.len() <= 50, "len = {}", cache.len());
    let stats = cache.stats();
    assert_eq!(stats.evictions as usize, 300 - cache.len());
    assert!(stats.prune_rounds > 0);

    cache.shutdown().await.unwrap();
    assert!(!cache.is_sweeper_running());
}

#[tokio::test]
async fn test_sweep_evicts_expired_entries_too() {
    // Expired entries are only ever removed by eviction or clear
    let (cache, clock) = quiet_cache(10);
    for i in 0..30 {
        cache.set(format!("key{}", i), i, Duration::from_secs(1));
    }
    clock.advance(Duration::from_secs(5));
    assert_eq!(cache.len(), 30);

    cache.sweep();

    assert!(cache.len() <= 10);
}
