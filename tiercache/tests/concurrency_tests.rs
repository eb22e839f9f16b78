//! Many tasks reading and writing through one cache (and through peers)

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use common::{Backend, peer_cache, setup_cache};
use tiercache::{Cache, CacheError};

const TASKS: u64 = 8;
const OPS_PER_TASK: u64 = 60;

async fn list(cache: &Cache, backend: &Backend) -> BTreeSet<String> {
    cache
        .will_query("res", move || async move { Ok::<_, CacheError>(backend.list()) })
        .await
        .unwrap()
}

async fn add(cache: &Cache, backend: &Backend, key: &str) {
    cache
        .will_modify("res", move || async move {
            backend.add(key);
            Ok::<_, CacheError>(())
        })
        .await
        .unwrap();
}

/// Every writer must see its own addition on the very next read, whichever
/// process (cache instance) served it.
async fn run_workload(caches: Vec<Arc<Cache>>) {
    let backend = Backend::default();
    let sequence = Arc::new(AtomicU64::new(0));

    let mut handles = Vec::new();
    for t in 0..TASKS {
        let cache = caches[(t as usize) % caches.len()].clone();
        let backend = backend.clone();
        let sequence = sequence.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..OPS_PER_TASK {
                let idx = sequence.fetch_add(1, Ordering::SeqCst) + 1;
                let key = format!("x-{}", idx);
                if idx % 10 == 0 {
                    add(&cache, &backend, &key).await;
                    let res = list(&cache, &backend).await;
                    assert!(res.contains(&key), "list not found by key {}", key);
                } else {
                    list(&cache, &backend).await;
                }
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // Once quiet, every instance converges on the full set
    let expected = backend.list();
    for cache in &caches {
        assert_eq!(list(cache, &backend).await, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_single_instance() {
    let (cache, _remote) = setup_cache(64 * 1024);
    run_workload(vec![cache.clone()]).await;

    let stats = cache.stats();
    assert!(stats.local_hits + stats.remote_hits > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_peer_instances() {
    let (cache, remote) = setup_cache(64 * 1024);
    let peers = vec![cache, peer_cache(&remote), peer_cache(&remote)];
    run_workload(peers).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tiny_memory_limit() {
    // Every insert evicts the previous entry
    let (cache, _remote) = setup_cache(1);
    run_workload(vec![cache.clone()]).await;
    assert!(cache.stats().entries <= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_keys_hit_accounting() {
    let (cache, _remote) = setup_cache(1024 * 1024);

    for i in 0..16 {
        cache.update(&format!("key-{}", i), 1, &i).await.unwrap();
    }

    let mut handles = Vec::new();
    for t in 0..TASKS {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..16 {
                let value: i32 = cache.try_get(&format!("key-{}", i)).await.unwrap();
                assert_eq!(value, i);
            }
            t
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(cache.local_hits(), TASKS * 16);
    assert_eq!(cache.remote_hits(), 0);
}
