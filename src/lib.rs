pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod jira;
pub mod logger;
pub mod models;
pub mod token_store;

pub use auth::AuthClient;
pub use cache::{KeyringCache, MemoryCache, RedisCache, TokenCache};
pub use config::{CacheBackend, CacheConfig, ClientConfig, Config};
pub use errors::{AppError, AuthError, CacheError, ConfigError, JiraError, Operation};
pub use jira::{CommentInput, Issue, JiraClient, NewIssue, UserData, extract_user_data};
pub use models::{TokenRecord, TokenResponse};
pub use token_store::TokenStore;
