use url::Url;

use crate::config::ClientConfig;

/// Audience every Jira Cloud 3LO consent request targets.
pub const AUDIENCE: &str = "api.atlassian.com";

impl ClientConfig {
    /// Builds the consent URL the user visits to obtain an authorization code.
    pub fn authorization_url(&self, state: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}/authorize", self.auth_base_url))?;
        url.query_pairs_mut()
            .append_pair("audience", AUDIENCE)
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", state)
            .append_pair("response_type", "code")
            .append_pair("prompt", "consent");
        Ok(url)
    }
}

impl super::AuthClient {
    pub fn authorization_url(&self, state: &str) -> Result<Url, url::ParseError> {
        self.config.authorization_url(state)
    }
}
