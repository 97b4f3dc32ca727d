use async_trait::async_trait;
use chrono::Utc;
use keyring::Entry;
use serde::{Deserialize, Serialize};

use super::TokenCache;
use crate::errors::CacheError;

/// Token cache backed by the OS keyring.
///
/// The keyring has no native expiry, so every entry is wrapped together with
/// its deadline and treated as absent once the deadline has passed.
#[derive(Debug, Clone)]
pub struct KeyringCache {
    service: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    value: String,
    expires_at: i64,
}

impl KeyringCache {
    pub fn new(service: &str) -> Self {
        KeyringCache {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, CacheError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

#[async_trait]
impl TokenCache for KeyringCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entry = self.entry(key)?;
        let raw = match entry.get_password() {
            Ok(raw) if !raw.is_empty() => raw,
            Ok(_) | Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope = serde_json::from_str(&raw)?;
        if envelope.expires_at <= Utc::now().timestamp() {
            tracing::debug!("Keyring entry '{}' has expired, removing it", key);
            match entry.delete_password() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => tracing::warn!("Failed to delete expired keyring entry: {:?}", e),
            }
            return Ok(None);
        }

        Ok(Some(envelope.value))
    }

    async fn set(&self, key: &str, value: &str, expire_secs: u64) -> Result<(), CacheError> {
        let ttl = i64::try_from(expire_secs).map_err(|_| CacheError::Backend {
            reason: format!("expiry of {} seconds is out of range", expire_secs),
        })?;
        let envelope = Envelope {
            value: value.to_string(),
            expires_at: Utc::now().timestamp() + ttl,
        };
        self.entry(key)?
            .set_password(&serde_json::to_string(&envelope)?)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self.entry(key)?.delete_password() {
            Ok(()) => {
                tracing::info!("Token deleted from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                tracing::debug!("No token entry found in keyring to delete");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
