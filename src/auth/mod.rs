//! OAuth 2.0 (3LO) authorization for the Atlassian identity provider.
//!
//! This module builds the consent URL, runs the authorization-code and
//! refresh-token grants, and keeps the resulting token in the token store.

mod authorize;
mod core;
mod grants;
mod token_management;

pub use self::core::AuthClient;
