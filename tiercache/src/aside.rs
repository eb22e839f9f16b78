//! Cache-aside helpers built on [`Cache`]
//!
//! - [`Cache::will_modify`]: run the authoritative write, then expire the key
//! - [`Cache::will_query`]: read through the cache, computing and caching the
//!   value on a miss

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::error;

use crate::cache::Cache;
use crate::core::CacheError;

impl Cache {
    /// Run `mutate`, then expire `key` whatever the mutation returned.
    ///
    /// A failed expire is logged and dropped; the caller only sees the
    /// mutation's result.
    pub async fn will_modify<R, E, F, Fut>(&self, key: &str, mutate: F) -> Result<R, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let result = mutate().await;
        if let Err(e) = self.expire(key).await {
            error!("Cache will_modify expire key={} fail with {}", key, e);
        }
        result
    }

    /// Return the cached value for `key`, or compute and cache it.
    ///
    /// The version is read before `compute` runs and the fresh value is stored
    /// at that version. An expire landing while `compute` is in flight bumps
    /// the remote version past it, so the write is ignored remotely but still
    /// cached locally until the next expire (see [`Cache::update`]).
    pub async fn will_query<T, E, F, Fut>(&self, key: &str, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.try_get::<T>(key).await {
            Ok(value) => return Ok(value),
            Err(CacheError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let version = self.version(key).await.map_err(|e| {
            error!("Cache will_query version key={} fail with {}", key, e);
            E::from(e)
        })?;

        let value = compute().await?;

        if let Err(e) = self.update(key, version, &value).await {
            error!(
                "Cache will_query update key={} ver={} fail with {}",
                key, version, e
            );
        }
        Ok(value)
    }
}
