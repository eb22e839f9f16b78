use thiserror::Error;

/// Main error type for tiered cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Neither tier holds valid data for the key
    #[error("Cache not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport or protocol failure talking to the remote store
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),
}

impl CacheError {
    /// True for the expected "both tiers missed" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::RemoteUnavailable(err.to_string())
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
