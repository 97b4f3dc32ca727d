use std::sync::Arc;

use chrono::Utc;

use crate::cache::TokenCache;
use crate::errors::CacheError;
use crate::models::TokenRecord;

/// Cache key used when none is configured.
pub const DEFAULT_TOKEN_KEY: &str = "jira_oauth_token";

/// Reads and writes the single cached token record.
#[derive(Clone)]
pub struct TokenStore {
    cache: Arc<dyn TokenCache>,
    key: String,
    retention_secs: u64,
}

impl TokenStore {
    pub fn new(cache: Arc<dyn TokenCache>, key: impl Into<String>) -> Self {
        TokenStore {
            cache,
            key: key.into(),
            retention_secs: 0,
        }
    }

    /// Keeps written records in the cache for `secs` past their own expiry so
    /// the refresh grant can still read the refresh token of an expired record.
    pub fn with_retention(mut self, secs: u64) -> Self {
        self.retention_secs = secs;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the cached record if it is present, parsable and not expired.
    pub async fn load(&self) -> Option<TokenRecord> {
        let record = self.load_stale().await?;
        let now = Utc::now().timestamp();
        if record.is_valid_at(now) {
            tracing::debug!("Token cache hit (expires_at={})", record.expires_at);
            Some(record)
        } else {
            tracing::debug!(
                "Cached token expired: now={}, expires_at={}",
                now,
                record.expires_at
            );
            None
        }
    }

    /// Loads the cached record regardless of its expiry.
    ///
    /// Read and parse failures are logged and reported as a miss.
    pub async fn load_stale(&self) -> Option<TokenRecord> {
        let raw = match self.cache.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No token found in cache under '{}'", self.key);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to load token from cache: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<TokenRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Discarding unparsable cached token: {}", e);
                None
            }
        }
    }

    /// Stamps `expires_at = now + ttl_secs` on the record and writes it with a
    /// cache expiry of `ttl_secs` (plus the configured retention).
    pub async fn save(
        &self,
        mut record: TokenRecord,
        ttl_secs: u64,
    ) -> Result<TokenRecord, CacheError> {
        let ttl = i64::try_from(ttl_secs).map_err(|_| CacheError::Backend {
            reason: format!("token lifetime of {} seconds is out of range", ttl_secs),
        })?;
        record.expires_at = Utc::now().timestamp() + ttl;

        let serialized = serde_json::to_string(&record)?;
        self.cache
            .set(&self.key, &serialized, ttl_secs.saturating_add(self.retention_secs))
            .await?;

        tracing::debug!("Token cached under '{}' for {}s", self.key, ttl_secs);
        Ok(record)
    }

    /// Removes the cached record.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.cache.delete(&self.key).await
    }
}
