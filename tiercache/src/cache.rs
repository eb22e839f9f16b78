//! Two-tier cache facade
//!
//! Reads go to the local tier first and are validated against the remote
//! version counter; misses and stale entries are refetched from the remote
//! tier and repopulate the local one.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, error, info};

use crate::core::{CacheConfig, CacheError, CacheStats, LocalCache, Result};
use crate::remote::{RemoteStore, UpdateOutcome};

/// Process-wide cache handle
///
/// Built once at startup and shared (typically as `Arc<Cache>`) for the rest of
/// the process lifetime.
pub struct Cache {
    local: LocalCache,
    remote: Arc<dyn RemoteStore>,
    enabled: AtomicBool,
    show_log: AtomicBool,
    local_hits: AtomicU64,
    remote_hits: AtomicU64,
}

impl Cache {
    pub fn new(config: CacheConfig, remote: Arc<dyn RemoteStore>) -> Self {
        info!(
            "Initializing tiered cache with memory_limit={}B, enabled={}",
            config.memory_limit, config.enabled
        );

        Self {
            local: LocalCache::new(config.memory_limit),
            remote,
            enabled: AtomicBool::new(config.enabled),
            show_log: AtomicBool::new(config.show_log),
            local_hits: AtomicU64::new(0),
            remote_hits: AtomicU64::new(0),
        }
    }

    /// Current remote version of `key` (0 when never written or disabled)
    pub async fn version(&self, key: &str) -> Result<i64> {
        if !self.is_enabled() {
            return Ok(0);
        }
        self.remote.get_version(key).await
    }

    /// Store `value` under `key` at `version` in both tiers.
    ///
    /// The local tier is populated even when the remote rejects the write as
    /// older than what it holds. Until the next [`expire`](Self::expire) bumps
    /// the remote version again, local reads keep returning this value; this is
    /// a known hazard callers must tolerate.
    ///
    /// # Panics
    /// If `value` serializes to zero bytes.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        key: &str,
        version: i64,
        value: &T,
    ) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let payload = serde_json::to_vec(value).map_err(|e| {
            error!("Cache update marshal fail for key={} with {}", key, e);
            CacheError::from(e)
        })?;
        assert!(!payload.is_empty(), "empty payload for cache key {}", key);

        let outcome = self
            .remote
            .conditional_update(key, version, &payload)
            .await
            .inspect_err(|e| {
                error!("Cache update remote fail for key={} with {}", key, e);
            })?;

        self.trace(|| {
            debug!(
                "Cache update remote key={} ver={} size={} -> {:?}",
                key,
                version,
                payload.len(),
                outcome
            )
        });
        if outcome == UpdateOutcome::Ignored {
            self.trace(|| {
                debug!(
                    "Cache update key={} ver={} was stale remotely, cached locally anyway",
                    key, version
                )
            });
        }

        self.local.insert(key, version, payload);
        Ok(())
    }

    /// Drop `key` from the local tier, then invalidate it remotely
    pub async fn expire(&self, key: &str) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        self.local.remove(key);
        let version = self.remote.invalidate(key).await.inspect_err(|e| {
            error!("Cache expire remote fail for key={} with {}", key, e);
        })?;

        self.trace(|| debug!("Cache expire key={} -> ver={}", key, version));
        Ok(())
    }

    /// Read `key`, local tier first.
    ///
    /// Returns [`CacheError::NotFound`] when neither tier holds valid data.
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        if !self.is_enabled() {
            return Err(CacheError::NotFound(key.to_string()));
        }

        if let Some(item) = self.local.lookup(key) {
            let remote_version = self.remote.get_version(key).await.inspect_err(|e| {
                error!("Cache try get version for key={} fail with {}", key, e);
            })?;

            if item.version == remote_version {
                let value = item.decode().inspect_err(|e| {
                    error!("Cache try get unmarshal key={} fail with {}", key, e);
                })?;
                let hits = self.local_hits.fetch_add(1, Ordering::Relaxed) + 1;
                self.trace(|| {
                    debug!(
                        "Cache local hit({}) key={} ver={}",
                        hits, key, item.version
                    )
                });
                return Ok(value);
            }

            // Local copy is stale
            self.local.remove(key);
        }

        let record = self.remote.batch_read(key).await.inspect_err(|e| {
            error!("Cache try get data for key={} fail with {}", key, e);
        })?;
        if record.version < 1 || record.payload.is_empty() {
            return Err(CacheError::NotFound(key.to_string()));
        }

        // Undecodable payloads never reach the local tier
        let value: T = serde_json::from_slice(&record.payload).map_err(|e| {
            error!("Cache try get unmarshal key={} fail with {}", key, e);
            CacheError::from(e)
        })?;

        let version = record.version;
        self.local.insert(key, version, record.payload);
        let hits = self.remote_hits.fetch_add(1, Ordering::Relaxed) + 1;
        self.trace(|| {
            debug!(
                "Cache remote hit({}) key={} ver={}",
                hits, key, version
            )
        });
        Ok(value)
    }

    /// Drop only the local copy of `key`, leaving the remote untouched.
    ///
    /// The next read refetches from the remote tier.
    pub fn evict_local(&self, key: &str) -> bool {
        self.local.remove(key).is_some()
    }

    /// Drop every local entry; remote versions are untouched
    pub fn clear_local(&self) {
        self.local.clear();
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_show_log(&self, show_log: bool) {
        self.show_log.store(show_log, Ordering::Relaxed);
    }

    pub fn show_log(&self) -> bool {
        self.show_log.load(Ordering::Relaxed)
    }

    pub fn local_hits(&self) -> u64 {
        self.local_hits.load(Ordering::Relaxed)
    }

    pub fn remote_hits(&self) -> u64 {
        self.remote_hits.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> CacheStats {
        let local = self.local.stats();
        CacheStats {
            local_hits: self.local_hits(),
            remote_hits: self.remote_hits(),
            entries: local.entries,
            total_bytes: local.total_bytes,
            memory_limit: local.memory_limit,
            evictions: local.evictions,
        }
    }

    pub fn reset_stats(&self) {
        self.local_hits.store(0, Ordering::Relaxed);
        self.remote_hits.store(0, Ordering::Relaxed);
    }

    pub(crate) fn trace(&self, emit: impl FnOnce()) {
        if self.show_log() {
            emit();
        }
    }
}
