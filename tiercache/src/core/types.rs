use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::error::Result;

/// Fixed per-entry overhead added to the payload and key length
pub const ITEM_OVERHEAD: u64 = 64;

/// Versioned cache entry held by the local tier
#[derive(Debug, Clone)]
pub struct Item {
    pub key: String,
    pub version: i64,
    /// Serialized value (JSON)
    pub payload: Vec<u8>,
    /// When the entry was inserted into the local tier
    pub last_touched: Instant,
}

impl Item {
    pub fn new(key: impl Into<String>, version: i64, payload: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            version,
            payload,
            last_touched: Instant::now(),
        }
    }

    /// Approximate memory footprint used for eviction accounting
    pub fn size(&self) -> u64 {
        (self.payload.len() + self.key.len()) as u64 + ITEM_OVERHEAD
    }

    /// Decode the JSON payload into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    pub fn age(&self) -> Duration {
        self.last_touched.elapsed()
    }
}

/// Runtime configuration for a [`Cache`](crate::Cache)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Local tier memory budget in bytes
    pub memory_limit: u64,
    /// When false every operation is a miss/no-op
    pub enabled: bool,
    /// Emit debug traces for hits, updates and expirations
    pub show_log: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_limit: 64 * 1024 * 1024,
            enabled: true,
            show_log: false,
        }
    }
}

impl CacheConfig {
    pub fn with_memory_limit(mut self, memory_limit: u64) -> Self {
        self.memory_limit = memory_limit;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_show_log(mut self, show_log: bool) -> Self {
        self.show_log = show_log;
        self
    }
}

/// Snapshot of cache counters
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Reads served from the local tier after a version check
    pub local_hits: u64,
    /// Reads served by fetching from the remote tier
    pub remote_hits: u64,
    /// Number of entries in the local tier
    pub entries: usize,
    /// Sum of `Item::size()` over local entries
    pub total_bytes: u64,
    pub memory_limit: u64,
    /// Entries dropped to stay under the memory limit
    pub evictions: u64,
}

impl CacheStats {
    /// Share of hits served locally
    pub fn local_hit_rate(&self) -> f64 {
        let total = self.local_hits + self.remote_hits;
        if total == 0 {
            0.0
        } else {
            self.local_hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_size() {
        let item = Item::new("res", 1, b"{\"a\":true}".to_vec());
        assert_eq!(item.size(), 3 + 10 + ITEM_OVERHEAD);
    }

    #[test]
    fn test_item_decode() {
        let item = Item::new("n", 1, b"[1,2,3]".to_vec());
        let v: Vec<u32> = item.decode().unwrap();
        assert_eq!(v, vec![1, 2, 3]);

        let bad = Item::new("n", 1, b"{".to_vec());
        assert!(bad.decode::<Vec<u32>>().is_err());
    }

    #[test]
    fn test_config_builders() {
        let config = CacheConfig::default()
            .with_memory_limit(1024)
            .with_show_log(true)
            .disabled();
        assert_eq!(config.memory_limit, 1024);
        assert!(config.show_log);
        assert!(!config.enabled);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            local_hits: 3,
            remote_hits: 1,
            ..Default::default()
        };
        assert_eq!(stats.local_hit_rate(), 0.75);
        assert_eq!(CacheStats::default().local_hit_rate(), 0.0);
    }
}
