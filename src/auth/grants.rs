use secrecy::ExposeSecret;
use serde_json::json;

use crate::errors::{AuthError, Grant};
use crate::models::TokenResponse;

impl super::AuthClient {
    /// Exchanges an authorization code for a token (no caching).
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let body = json!({
            "grant_type": Grant::AuthorizationCode.as_str(),
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret.expose_secret(),
            "code": code,
            "redirect_uri": self.config.redirect_uri,
        });

        self.call_token_endpoint(Grant::AuthorizationCode, &body)
            .await
    }

    /// Runs the refresh-token grant with the refresh token of the cached
    /// record, expired or not, and caches the new token.
    pub async fn refresh(&self) -> Result<TokenResponse, AuthError> {
        let refresh_token = self
            .store
            .load_stale()
            .await
            .and_then(|record| record.refresh_token)
            .ok_or(AuthError::NoRefreshToken)?;

        let body = json!({
            "grant_type": Grant::RefreshToken.as_str(),
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret.expose_secret(),
            "refresh_token": refresh_token.expose_secret(),
        });

        let response = self.call_token_endpoint(Grant::RefreshToken, &body).await?;
        self.persist(&response).await?;
        Ok(response)
    }

    /// Caches a token response for its reported lifetime.
    pub(in crate::auth) async fn persist(&self, response: &TokenResponse) -> Result<(), AuthError> {
        let ttl = response.lifetime_secs();
        self.store.save(response.clone().into(), ttl).await?;
        Ok(())
    }

    async fn call_token_endpoint(
        &self,
        grant: Grant,
        body: &serde_json::Value,
    ) -> Result<TokenResponse, AuthError> {
        let url = format!("{}/oauth/token", self.config.auth_base_url);
        tracing::debug!("POST {} (grant_type={})", url, grant.as_str());

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|source| {
                tracing::error!("Failed to {}: {}", grant, source);
                AuthError::Request { grant, source }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Failed to {}: {} {}", grant, status, body);
            return Err(AuthError::TokenEndpoint {
                grant,
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|source| AuthError::InvalidTokenResponse { grant, source })?;

        tracing::info!(
            "Token obtained via {} grant (expires_in={:?})",
            grant.as_str(),
            token_response.expires_in
        );
        Ok(token_response)
    }
}
