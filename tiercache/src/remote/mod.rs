//! Remote (shared) tier
//!
//! Every logical key `K` is stored as two slots on the remote store:
//! - `K-ver`: integer version, absent means 0
//! - `K-val`: serialized payload, absent or empty means no data
//!
//! Both slots only ever change together, through [`RemoteStore::conditional_update`]
//! or [`RemoteStore::invalidate`].

pub mod memory;
pub mod redis_store;

pub use memory::MemoryRemote;
pub use redis_store::RedisRemote;

use async_trait::async_trait;

use crate::core::Result;

/// Result of a conditional update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Both slots were written
    Applied,
    /// A newer version was already stored; nothing changed
    Ignored,
}

/// Both slots of a key, read in one round trip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRecord {
    pub version: i64,
    pub payload: Vec<u8>,
}

/// Atomic operations the cache needs from the shared store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Current version of `key`; 0 when never written
    async fn get_version(&self, key: &str) -> Result<i64>;

    /// Write version and payload together unless the stored version is
    /// strictly greater than `version`
    async fn conditional_update(
        &self,
        key: &str,
        version: i64,
        payload: &[u8],
    ) -> Result<UpdateOutcome>;

    /// Clear the payload and bump the version in one transaction.
    /// Returns the new version.
    async fn invalidate(&self, key: &str) -> Result<i64>;

    /// Read version and payload together
    async fn batch_read(&self, key: &str) -> Result<RemoteRecord>;
}

/// Name of the version slot for `key`
pub fn version_key(key: &str) -> String {
    format!("{}-ver", key)
}

/// Name of the payload slot for `key`
pub fn value_key(key: &str) -> String {
    format!("{}-val", key)
}
