//! Cache Store
//!
//! Key/value store with per-entry expiry and prefix enumeration. The error
//! pipeline memoizes completions here and the dashboard reads history from it.

mod memory_store;
mod redis_store;

pub use memory_store::MemoryCacheStore;
pub use redis_store::RedisCacheStore;

use async_trait::async_trait;
use std::time::Duration;

/// Cache store errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache command error: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Cache TTL out of range: {0:?}")]
    InvalidTtl(Duration),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value; `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires `ttl` after this write
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// All live keys starting with `prefix`, in store order
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError>;
}
