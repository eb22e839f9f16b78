//! # tiercache
//!
//! Two-tier read-through/write-through cache: a memory-bounded in-process tier
//! in front of a shared, versioned Redis-compatible store.
//!
//! Each key carries a version counter on the remote store. Local reads are only
//! served after the remote version matches, writes are rejected remotely when a
//! newer version is already stored, and expiring a key bumps its version so every
//! process sharing the store drops its local copy on the next read.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiercache::{Cache, RedisRemote, TierCacheConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = TierCacheConfig::default();
//! let remote = RedisRemote::connect(&config.remote).await?;
//! let cache = Cache::new(config.to_cache_config(), Arc::new(remote));
//!
//! let users: Vec<String> = cache
//!     .will_query("users", || async { Ok::<_, anyhow::Error>(vec!["ada".to_string()]) })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod aside;
pub mod cache;
pub mod config;
pub mod core;
pub mod logging;
pub mod remote;

pub use cache::Cache;
pub use config::{CacheSection, LoggingConfig, RemoteConfig, TierCacheConfig};
pub use crate::core::{CacheConfig, CacheError, CacheStats, Item, LocalCache, Result};
pub use logging::init_tracing;
pub use remote::{MemoryRemote, RedisRemote, RemoteRecord, RemoteStore, UpdateOutcome};
