pub mod error;
pub mod local;
pub mod types;

pub use error::{CacheError, Result};
pub use local::{LocalCache, LocalStats};
pub use types::{CacheConfig, CacheStats, ITEM_OVERHEAD, Item};
