use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::CacheConfig;

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierCacheConfig {
    pub cache: CacheSection,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSection {
    pub memory_limit_mb: u64,
    pub enabled: bool,
    pub show_log: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Redis connection URL, e.g. `redis://127.0.0.1:6379/0`
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `json`, `pretty` or `compact`
    pub format: String,
}

impl Default for TierCacheConfig {
    fn default() -> Self {
        Self {
            cache: CacheSection {
                memory_limit_mb: 64,
                enabled: true,
                show_log: false,
            },
            remote: RemoteConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl TierCacheConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: TierCacheConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Convert to the runtime cache configuration
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            memory_limit: self.cache.memory_limit_mb * 1024 * 1024,
            enabled: self.cache.enabled,
            show_log: self.cache.show_log,
        }
    }
}
