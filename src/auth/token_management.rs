use secrecy::ExposeSecret;

use crate::errors::{AuthError, CacheError};

impl super::AuthClient {
    /// Returns a usable access token.
    ///
    /// A cached, unexpired token wins. Otherwise `authorization_code` is
    /// exchanged when given, and the refresh grant is used when it is not.
    pub async fn get_token(&self, authorization_code: Option<&str>) -> Result<String, AuthError> {
        if let Some(record) = self.store.load().await {
            return Ok(record.access_token.expose_secret().clone());
        }

        let response = match authorization_code {
            Some(code) => {
                tracing::info!("No cached token, exchanging authorization code");
                let response = self.exchange_code(code).await?;
                self.persist(&response).await?;
                response
            }
            None => {
                tracing::info!("No cached token, refreshing");
                self.refresh().await?
            }
        };

        Ok(response.access_token)
    }

    /// Forgets the cached token.
    pub async fn logout(&self) -> Result<(), CacheError> {
        self.store.clear().await?;
        tracing::info!("Cached token removed");
        Ok(())
    }
}
