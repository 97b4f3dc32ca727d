use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::models::{deserialize_secret, serialize_secret};
use crate::token_store::DEFAULT_TOKEN_KEY;

/// OAuth 2.0 (3LO) client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Atlassian developer console client id
    #[serde(default)]
    pub client_id: String,

    #[serde(
        default = "empty_secret",
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub client_secret: SecretString,

    /// Callback URL registered for the app
    #[serde(default)]
    pub redirect_uri: String,

    /// Scopes requested on the consent screen
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Identity provider base URL (default: https://auth.atlassian.com)
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,

    /// API gateway base URL (default: https://api.atlassian.com)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_scopes() -> Vec<String> {
    [
        "read:jira-work",
        "write:jira-work",
        "read:jira-user",
        "offline_access",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_auth_base_url() -> String {
    "https://auth.atlassian.com".to_string()
}

fn default_api_base_url() -> String {
    "https://api.atlassian.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: empty_secret(),
            redirect_uri: String::new(),
            scopes: default_scopes(),
            auth_base_url: default_auth_base_url(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            redirect_uri: redirect_uri.into(),
            ..Default::default()
        }
    }

    /// Points both the identity provider and the API gateway at `base_url`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        self.auth_base_url = base.clone();
        self.api_base_url = base;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<&str> = [
            ("client_id", self.client_id.trim().is_empty()),
            (
                "client_secret",
                self.client_secret.expose_secret().trim().is_empty(),
            ),
            ("redirect_uri", self.redirect_uri.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError {
                reason: format!("missing OAuth settings: {}", missing.join(", ")),
            })
        }
    }
}

/// Token cache backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Keyring,
    Memory,
}

/// Token cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// Redis connection URL (host, port and database)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Service name used for keyring entries
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Cache key holding the token record
    #[serde(default = "default_cache_key")]
    pub key: String,

    /// Seconds an expired record stays readable for the refresh grant
    #[serde(default)]
    pub retention_secs: u64,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/0".to_string()
}

fn default_keyring_service() -> String {
    "jira-3lo".to_string()
}

fn default_cache_key() -> String {
    DEFAULT_TOKEN_KEY.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: default_redis_url(),
            keyring_service: default_keyring_service(),
            key: default_cache_key(),
            retention_secs: 0,
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// ログレベル（省略可、デフォルト: info）
    #[serde(default = "default_log_level")]
    pub level: String,

    /// ログファイルのパス（省略時は標準エラー出力）
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
        }
    }
}

/// メイン設定構造体
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub oauth: ClientConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Applies `JIRA_CLIENT_ID`, `JIRA_CLIENT_SECRET`, `JIRA_REDIRECT_URI` and
    /// `JIRA_REDIS_URL` on top of the file values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(client_id) = lookup("JIRA_CLIENT_ID") {
            self.oauth.client_id = client_id;
        }
        if let Some(client_secret) = lookup("JIRA_CLIENT_SECRET") {
            self.oauth.client_secret = SecretString::new(client_secret);
        }
        if let Some(redirect_uri) = lookup("JIRA_REDIRECT_URI") {
            self.oauth.redirect_uri = redirect_uri;
        }
        if let Some(redis_url) = lookup("JIRA_REDIS_URL") {
            self.cache.redis_url = redis_url;
        }
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    pub fn log_file_path(&self) -> &Option<String> {
        &self.logging.file_path
    }
}

/// 設定ファイルのパスを取得
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push("jira-3lo");
        path.push("config.toml");
        path
    })
}

/// 設定ファイルを読み込む
///
/// An explicit `path` must exist; the default location is optional and falls
/// back to defaults. Environment overrides are applied in both cases.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => match config_file_path() {
            Some(default_path) if default_path.exists() => {
                parse_config(&fs::read_to_string(default_path)?)?
            }
            _ => Config::default(),
        },
    };

    config.apply_env_overrides(|name| std::env::var(name).ok());
    Ok(config)
}

fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(contents)?)
}
