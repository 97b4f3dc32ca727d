use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Token record as persisted in the token cache.
///
/// Provider fields this crate does not interpret (`token_type`, `scope`,
/// `expires_in`, ...) are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub access_token: SecretString,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret_option",
        deserialize_with = "deserialize_secret_option"
    )]
    pub refresh_token: Option<SecretString>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    /// A record is usable only while `expires_at` is strictly in the future.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

/// Response body of `POST /oauth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenResponse {
    /// Validity window reported by the provider, or the default lifetime.
    pub fn lifetime_secs(&self) -> u64 {
        self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
    }
}

impl From<TokenResponse> for TokenRecord {
    fn from(response: TokenResponse) -> Self {
        let mut extra = response.extra;
        if let Some(expires_in) = response.expires_in {
            extra.insert("expires_in".to_string(), Value::from(expires_in));
        }

        TokenRecord {
            access_token: SecretString::new(response.access_token),
            refresh_token: response.refresh_token.map(SecretString::new),
            expires_at: 0,
            extra,
        }
    }
}

// Custom serialization for SecretString
pub fn serialize_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

pub fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s))
}

// Custom serialization for Option<SecretString>
pub fn serialize_secret_option<S>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize_secret_option<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(SecretString::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_record_keeps_provider_fields() {
        let raw = json!({
            "access_token": "abc",
            "refresh_token": "def",
            "expires_at": 1_900_000_000i64,
            "token_type": "Bearer",
            "scope": "read:jira-work offline_access"
        });

        let record: TokenRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.access_token.expose_secret(), "abc");
        assert_eq!(
            record.refresh_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("def")
        );
        assert_eq!(record.extra["token_type"], "Bearer");

        let serialized = serde_json::to_value(&record).unwrap();
        assert_eq!(serialized["scope"], "read:jira-work offline_access");
        assert_eq!(serialized["access_token"], "abc");
    }

    #[test]
    fn test_token_record_without_refresh_token() {
        let record: TokenRecord =
            serde_json::from_str(r#"{"access_token":"abc","expires_at":10}"#).unwrap();
        assert!(record.refresh_token.is_none());

        let serialized = serde_json::to_string(&record).unwrap();
        assert!(!serialized.contains("refresh_token"));
    }

    #[test]
    fn test_token_record_validity_is_strict() {
        let record: TokenRecord =
            serde_json::from_str(r#"{"access_token":"abc","expires_at":100}"#).unwrap();
        assert!(record.is_valid_at(99));
        assert!(!record.is_valid_at(100));
        assert!(!record.is_valid_at(101));
    }

    #[test]
    fn test_token_response_defaults_lifetime() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(response.lifetime_secs(), DEFAULT_TOKEN_LIFETIME_SECS);

        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":600}"#).unwrap();
        assert_eq!(response.lifetime_secs(), 600);
    }

    #[test]
    fn test_record_from_response() {
        let response: TokenResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "refresh_token": "def",
            "expires_in": 3600,
            "token_type": "Bearer"
        }))
        .unwrap();

        let record = TokenRecord::from(response);
        assert_eq!(record.access_token.expose_secret(), "abc");
        assert_eq!(record.extra["expires_in"], 3600);
        assert_eq!(record.extra["token_type"], "Bearer");
        assert_eq!(record.expires_at, 0);
    }
}
