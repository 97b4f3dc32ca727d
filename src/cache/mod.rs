//! Key-value cache collaborators for the token record.
//!
//! The token store only needs `get`, `set` with a per-key expiry and `delete`.
//! Backends: Redis, the OS keyring, and an in-process map.

mod keyring_cache;
mod memory;
mod redis_cache;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{CacheBackend, CacheConfig};
use crate::errors::CacheError;

pub use keyring_cache::KeyringCache;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`; the entry expires after `expire_secs`.
    async fn set(&self, key: &str, value: &str, expire_secs: u64) -> Result<(), CacheError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Builds the cache backend selected in the configuration.
pub async fn from_config(config: &CacheConfig) -> Result<Arc<dyn TokenCache>, CacheError> {
    match config.backend {
        CacheBackend::Redis => {
            tracing::debug!("Using Redis token cache at {}", config.redis_url);
            Ok(Arc::new(RedisCache::connect(&config.redis_url).await?))
        }
        CacheBackend::Keyring => {
            tracing::debug!("Using OS keyring token cache");
            Ok(Arc::new(KeyringCache::new(&config.keyring_service)))
        }
        CacheBackend::Memory => {
            tracing::warn!("Using in-memory token cache; tokens will not outlive this process");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}
