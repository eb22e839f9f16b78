//! Common test utilities

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tiercache::{Cache, CacheConfig, LoggingConfig, MemoryRemote, init_tracing};

/// Install a compact subscriber once; honours RUST_LOG
#[allow(dead_code)]
pub fn init_test_logging() {
    init_tracing(&LoggingConfig {
        level: "warn".to_string(),
        format: "compact".to_string(),
    });
}

/// Cache over a fresh in-memory remote, plus a handle on that remote
#[allow(dead_code)]
pub fn setup_cache(memory_limit: u64) -> (Arc<Cache>, MemoryRemote) {
    init_test_logging();
    let remote = MemoryRemote::new();
    let cache = Cache::new(
        CacheConfig::default()
            .with_memory_limit(memory_limit)
            .with_show_log(true),
        Arc::new(remote.clone()),
    );
    (Arc::new(cache), remote)
}

/// Second "process" sharing the same remote tier
#[allow(dead_code)]
pub fn peer_cache(remote: &MemoryRemote) -> Arc<Cache> {
    Arc::new(Cache::new(CacheConfig::default(), Arc::new(remote.clone())))
}

/// Stand-in for the authoritative data source behind the cache
#[allow(dead_code)]
#[derive(Default, Clone)]
pub struct Backend {
    added: Arc<Mutex<BTreeSet<String>>>,
    /// Simulated latency while holding the backend lock
    pub delay: Option<Duration>,
}

#[allow(dead_code)]
impl Backend {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn add(&self, key: &str) {
        let mut added = self.added.lock();
        added.insert(key.to_string());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
    }

    pub fn list(&self) -> BTreeSet<String> {
        let added = self.added.lock();
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        added.clone()
    }
}
