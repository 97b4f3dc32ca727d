use std::fmt;

use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug)]
pub enum AppError {
    /// 認証関連エラー
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Jira API関連エラー
    #[error("Jira API error: {0}")]
    Jira(#[from] JiraError),

    /// トークンキャッシュ関連エラー
    #[error("Token cache error: {0}")]
    Cache(#[from] CacheError),

    /// 設定関連エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// ログ初期化エラー
    #[error("Logging setup failed: {reason}")]
    Logging { reason: String },

    /// 汎用エラー
    #[error("{message}")]
    Generic { message: String },
}

/// トークンキャッシュ関連エラー
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis操作エラー
    #[error("Redis error: {source}")]
    Redis {
        #[source]
        source: redis::RedisError,
    },

    /// Keyring操作エラー
    #[error("Keyring error: {source}")]
    Keyring {
        #[source]
        source: keyring::Error,
    },

    /// シリアライズエラー
    #[error("Failed to serialize cache entry: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// その他のバックエンドエラー
    #[error("Cache backend error: {reason}")]
    Backend { reason: String },
}

/// The OAuth grant a token endpoint call was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    AuthorizationCode,
    RefreshToken,
}

impl Grant {
    /// Value of the `grant_type` field sent to the token endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode => "authorization_code",
            Grant::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grant::AuthorizationCode => f.write_str("exchange authorization code for token"),
            Grant::RefreshToken => f.write_str("refresh token"),
        }
    }
}

/// 認証（トークン取得）関連エラー
#[derive(Error, Debug)]
pub enum AuthError {
    /// HTTPリクエストエラー
    #[error("Failed to {grant}: {source}")]
    Request {
        grant: Grant,
        #[source]
        source: reqwest::Error,
    },

    /// トークンエンドポイントが2xx以外を返した
    #[error("Failed to {grant}: token endpoint returned {status}: {body}")]
    TokenEndpoint {
        grant: Grant,
        status: u16,
        body: String,
    },

    /// レスポンスのデコードエラー
    #[error("Failed to {grant}: invalid token response: {source}")]
    InvalidTokenResponse {
        grant: Grant,
        #[source]
        source: reqwest::Error,
    },

    /// リフレッシュトークンが存在しない
    #[error("No refresh token available.")]
    NoRefreshToken,

    /// トークンの保存に失敗
    #[error("Failed to cache token: {0}")]
    Cache(#[from] CacheError),
}

/// A Jira resource operation, used to give failures their context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DiscoverResources,
    CreateIssue,
    UpdateIssue,
    DeleteIssue,
    GetIssue,
    ListIssues,
    ListProjects,
    AddComment,
    ListComments,
    ReactToComment,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::DiscoverResources => "get accessible resources",
            Operation::CreateIssue => "create Jira issue",
            Operation::UpdateIssue => "update Jira issue",
            Operation::DeleteIssue => "delete Jira issue",
            Operation::GetIssue => "get Jira issue",
            Operation::ListIssues => "list Jira issues",
            Operation::ListProjects => "list Jira projects",
            Operation::AddComment => "add comment",
            Operation::ListComments => "get comments",
            Operation::ReactToComment => "react to comment",
        };
        f.write_str(name)
    }
}

/// Jira API関連エラー
#[derive(Error, Debug)]
pub enum JiraError {
    /// アクセストークンを取得できなかった
    #[error("Failed to {operation}: {source}")]
    Auth {
        operation: Operation,
        #[source]
        source: AuthError,
    },

    /// HTTPリクエストエラー
    #[error("Failed to {operation}: {source}")]
    Request {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// 2xx以外のレスポンス
    #[error("Failed to {operation}: HTTP {status}: {body}")]
    Status {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// 課題作成時の400 Bad Request
    #[error("Jira rejected the issue (400 Bad Request): {body}")]
    Validation { body: String },

    /// レスポンスのデコードエラー
    #[error("Failed to {operation}: could not decode response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// cloud idを決定できない
    #[error("Cannot determine tenant id: {reason}")]
    TenantUnresolved { reason: String },

    /// Jira Cloud APIが提供していない操作
    #[error("Jira Cloud API does not support the '{operation}' operation")]
    Unsupported { operation: Operation },
}

impl JiraError {
    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            JiraError::Status { status, .. } => Some(*status),
            JiraError::Validation { .. } => Some(400),
            JiraError::Auth {
                source: AuthError::TokenEndpoint { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// 設定関連エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 設定ファイル読み込みエラー
    #[error("Failed to load config file: {source}")]
    LoadError {
        #[source]
        source: std::io::Error,
    },

    /// 設定ファイルパースエラー
    #[error("Failed to parse config file: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    /// 設定バリデーションエラー
    #[error("Configuration validation failed: {reason}")]
    ValidationError { reason: String },
}

impl From<redis::RedisError> for CacheError {
    fn from(error: redis::RedisError) -> Self {
        CacheError::Redis { source: error }
    }
}

impl From<keyring::Error> for CacheError {
    fn from(error: keyring::Error) -> Self {
        CacheError::Keyring { source: error }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::Serialization { source: error }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::LoadError { source: error }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::ParseError { source: error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_refresh_token_message() {
        assert_eq!(
            AuthError::NoRefreshToken.to_string(),
            "No refresh token available."
        );
    }

    #[test]
    fn test_token_endpoint_error_names_grant() {
        let error = AuthError::TokenEndpoint {
            grant: Grant::RefreshToken,
            status: 401,
            body: "unauthorized_client".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("refresh token"));
        assert!(message.contains("401"));
        assert!(message.contains("unauthorized_client"));
    }

    #[test]
    fn test_grant_type_values() {
        assert_eq!(Grant::AuthorizationCode.as_str(), "authorization_code");
        assert_eq!(Grant::RefreshToken.as_str(), "refresh_token");
    }

    #[test]
    fn test_status_error_carries_operation() {
        let error = JiraError::Status {
            operation: Operation::DeleteIssue,
            status: 404,
            body: "Issue does not exist".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to delete Jira issue: HTTP 404: Issue does not exist"
        );
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_unsupported_error_message() {
        let error = JiraError::Unsupported {
            operation: Operation::ReactToComment,
        };
        assert!(error.to_string().contains("does not support"));
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_auth_error_converts_into_app_error() {
        let app_error: AppError = AuthError::NoRefreshToken.into();
        assert!(matches!(app_error, AppError::Auth(AuthError::NoRefreshToken)));
        assert!(app_error.to_string().starts_with("Authentication error"));
    }

    #[test]
    fn test_cache_error_from_serde() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error = CacheError::from(json_error);
        assert!(error.to_string().contains("serialize"));
    }
}
