use async_trait::async_trait;
use parking_lot::RwLock;
use radix_trie::{Trie, TrieCommon};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

use super::{RemoteRecord, RemoteStore, UpdateOutcome};
use crate::core::{CacheError, Result};

/// Both slots of one logical key
#[derive(Debug, Clone, Default)]
struct Slots {
    version: i64,
    payload: Vec<u8>,
}

/// In-process remote tier
///
/// Shares the Redis adapter's semantics: each operation runs under a single
/// lock acquisition, so version and payload are never observed half-written.
/// Clones share the same underlying data, which lets several [`Cache`](crate::Cache)
/// instances stand in for separate processes.
#[derive(Clone)]
pub struct MemoryRemote {
    data: Arc<RwLock<Trie<String, Slots>>>,
    unavailable: Arc<AtomicBool>,
    calls: Arc<AtomicU64>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        info!("Initializing in-memory remote tier");
        Self {
            data: Arc::new(RwLock::new(Trie::new())),
            unavailable: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Make every call fail with `RemoteUnavailable` until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of operations issued against this store, failed ones included
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of logical keys ever written
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin(&self, op: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::RemoteUnavailable(format!(
                "in-memory remote switched off ({})",
                op
            )));
        }
        Ok(())
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn get_version(&self, key: &str) -> Result<i64> {
        self.begin("GET")?;
        let data = self.data.read();
        Ok(data.get(key).map(|slots| slots.version).unwrap_or(0))
    }

    async fn conditional_update(
        &self,
        key: &str,
        version: i64,
        payload: &[u8],
    ) -> Result<UpdateOutcome> {
        self.begin("EVAL")?;
        let mut data = self.data.write();

        let stored = data.get(key).map(|slots| slots.version).unwrap_or(0);
        if stored > version {
            debug!(
                "Conditional update IGNORE key={} ver={} stored={}",
                key, version, stored
            );
            return Ok(UpdateOutcome::Ignored);
        }

        data.insert(
            key.to_string(),
            Slots {
                version,
                payload: payload.to_vec(),
            },
        );
        Ok(UpdateOutcome::Applied)
    }

    async fn invalidate(&self, key: &str) -> Result<i64> {
        self.begin("MULTI/EXEC")?;
        let mut data = self.data.write();

        let version = data.get(key).map(|slots| slots.version).unwrap_or(0) + 1;
        data.insert(
            key.to_string(),
            Slots {
                version,
                payload: Vec::new(),
            },
        );
        Ok(version)
    }

    async fn batch_read(&self, key: &str) -> Result<RemoteRecord> {
        self.begin("MGET")?;
        let data = self.data.read();
        Ok(data
            .get(key)
            .map(|slots| RemoteRecord {
                version: slots.version,
                payload: slots.payload.clone(),
            })
            .unwrap_or_default())
    }
}
