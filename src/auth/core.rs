use std::time::Duration;

use reqwest::Client;

use crate::config::ClientConfig;
use crate::errors::ConfigError;
use crate::token_store::TokenStore;

pub struct AuthClient {
    pub(in crate::auth) config: ClientConfig,
    pub(in crate::auth) http: Client,
    pub(in crate::auth) store: TokenStore,
}

impl AuthClient {
    /// Creates a new AuthClient with its own HTTP client
    pub fn new(config: ClientConfig, store: TokenStore) -> Result<Self, ConfigError> {
        config.validate()?;

        let http = Client::builder()
            .user_agent(format!("jira-3lo/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::ValidationError {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(AuthClient {
            config,
            http,
            store,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Shared HTTP client, reused by the resource client
    pub fn http_client(&self) -> &Client {
        &self.http
    }
}
