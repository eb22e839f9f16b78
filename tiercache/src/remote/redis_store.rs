//! Remote tier backed by Redis (or any server speaking its protocol)
//!
//! - conditional update: one `EVAL` of a compare-and-set script
//! - invalidate: `MULTI` / `SET K-val ""` / `INCR K-ver` / `EXEC`
//! - batch read: `MGET K-ver K-val`

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script, Value};
use tracing::{debug, info};

use super::{RemoteRecord, RemoteStore, UpdateOutcome, value_key, version_key};
use crate::config::RemoteConfig;
use crate::core::Result;

/// KEYS[1] = version slot, KEYS[2] = value slot, ARGV[1] = version, ARGV[2] = payload
const CONDITIONAL_UPDATE_SCRIPT: &str = r#"
local stored = redis.call('GET', KEYS[1])
if stored and tonumber(stored) > tonumber(ARGV[1]) then
    return redis.status_reply('IGNORE')
end
return redis.call('MSET', KEYS[1], ARGV[1], KEYS[2], ARGV[2])
"#;

const IGNORE_STATUS: &str = "IGNORE";

/// Redis adapter for the remote tier
///
/// Holds a multiplexed [`ConnectionManager`]; each operation works on its own
/// clone of it, dropped as soon as the call returns.
#[derive(Clone)]
pub struct RedisRemote {
    manager: ConnectionManager,
    update_script: Script,
}

impl RedisRemote {
    /// Connect using the `remote` section of the configuration
    pub async fn connect(config: &RemoteConfig) -> Result<Self> {
        info!("Connecting remote tier at {}", config.url);
        let client = redis::Client::open(config.url.as_str())?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::with_manager(manager))
    }

    /// Wrap an already established connection manager
    pub fn with_manager(manager: ConnectionManager) -> Self {
        Self {
            manager,
            update_script: Script::new(CONDITIONAL_UPDATE_SCRIPT),
        }
    }

    fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

#[async_trait]
impl RemoteStore for RedisRemote {
    async fn get_version(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection();
        let version: Option<i64> = conn.get(version_key(key)).await?;
        Ok(version.unwrap_or(0))
    }

    async fn conditional_update(
        &self,
        key: &str,
        version: i64,
        payload: &[u8],
    ) -> Result<UpdateOutcome> {
        let mut conn = self.connection();
        let reply: Value = self
            .update_script
            .key(version_key(key))
            .key(value_key(key))
            .arg(version)
            .arg(payload)
            .invoke_async(&mut conn)
            .await?;

        let outcome = outcome_from_reply(&reply);
        debug!(
            "Remote conditional update key={} ver={} size={} -> {:?}",
            key,
            version,
            payload.len(),
            outcome
        );
        Ok(outcome)
    }

    async fn invalidate(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection();
        let (version,): (i64,) = redis::pipe()
            .atomic()
            .set(value_key(key), Vec::<u8>::new())
            .ignore()
            .incr(version_key(key), 1)
            .query_async(&mut conn)
            .await?;

        debug!("Remote invalidate key={} -> ver={}", key, version);
        Ok(version)
    }

    async fn batch_read(&self, key: &str) -> Result<RemoteRecord> {
        let mut conn = self.connection();
        let (version, payload): (Option<String>, Option<Vec<u8>>) = redis::cmd("MGET")
            .arg(version_key(key))
            .arg(value_key(key))
            .query_async(&mut conn)
            .await?;

        Ok(RemoteRecord {
            version: parse_version(version.as_deref()),
            payload: payload.unwrap_or_default(),
        })
    }
}

fn outcome_from_reply(reply: &Value) -> UpdateOutcome {
    match reply {
        Value::SimpleString(status) if status == IGNORE_STATUS => UpdateOutcome::Ignored,
        _ => UpdateOutcome::Applied,
    }
}

/// Missing or non-numeric versions read as 0 (no data)
fn parse_version(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0)
}
