use std::sync::Arc;

use chrono::Utc;
use jira_3lo::cache::{MemoryCache, TokenCache};
use jira_3lo::errors::{AuthError, Grant};
use jira_3lo::{AuthClient, ClientConfig, TokenStore};
use secrecy::ExposeSecret;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "jira_oauth_token";

fn auth_client(server: &MockServer, cache: Arc<MemoryCache>) -> AuthClient {
    let config = ClientConfig::new("client-id", "client-secret", "https://app.example/callback")
        .with_base_url(&server.uri());
    let store = TokenStore::new(cache, KEY).with_retention(600);
    AuthClient::new(config, store).unwrap()
}

async fn seed(cache: &MemoryCache, record: serde_json::Value) {
    cache.set(KEY, &record.to_string(), 600).await.unwrap();
}

#[tokio::test]
async fn test_cached_token_is_returned_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    seed(
        &cache,
        json!({
            "access_token": "cached-token",
            "refresh_token": "r1",
            "expires_at": Utc::now().timestamp() + 600
        }),
    )
    .await;

    let client = auth_client(&server, cache);
    assert_eq!(client.get_token(None).await.unwrap(), "cached-token");
    assert_eq!(client.get_token(Some("ignored")).await.unwrap(), "cached-token");
}

#[tokio::test]
async fn test_code_exchange_persists_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "authorization_code",
            "client_id": "client-id",
            "client_secret": "client-secret",
            "code": "auth-code",
            "redirect_uri": "https://app.example/callback"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "R",
            "expires_in": 3600,
            "token_type": "Bearer",
            "scope": "read:jira-work offline_access"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let client = auth_client(&server, cache);

    let before = Utc::now().timestamp();
    assert_eq!(client.get_token(Some("auth-code")).await.unwrap(), "A");

    let record = client.token_store().load().await.unwrap();
    assert_eq!(record.access_token.expose_secret(), "A");
    assert_eq!(record.refresh_token.unwrap().expose_secret(), "R");
    assert!(record.expires_at >= before + 3600);
    assert!(record.expires_at <= Utc::now().timestamp() + 3600);
    assert_eq!(record.extra["token_type"], "Bearer");

    // second call is served from the cache
    assert_eq!(client.get_token(None).await.unwrap(), "A");
}

#[tokio::test]
async fn test_missing_expires_in_defaults_to_one_hour() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "A" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = auth_client(&server, Arc::new(MemoryCache::new()));
    let now = Utc::now().timestamp();
    client.get_token(Some("code")).await.unwrap();

    let record = client.token_store().load().await.unwrap();
    assert!(record.expires_at >= now + 3600);
    assert!(record.expires_at <= now + 3602);
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "client_id": "client-id",
            "client_secret": "client-secret",
            "refresh_token": "R"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "B",
            "refresh_token": "R2",
            "expires_in": 1800
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    seed(
        &cache,
        json!({
            "access_token": "old",
            "refresh_token": "R",
            "expires_at": Utc::now().timestamp() - 10
        }),
    )
    .await;

    let client = auth_client(&server, cache);
    assert_eq!(client.get_token(None).await.unwrap(), "B");

    let record = client.token_store().load().await.unwrap();
    assert_eq!(record.refresh_token.unwrap().expose_secret(), "R2");
    assert!(record.expires_at > Utc::now().timestamp() + 1700);
}

#[tokio::test]
async fn test_refresh_without_refresh_token_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let client = auth_client(&server, cache.clone());
    let error = client.get_token(None).await.unwrap_err();
    assert!(matches!(error, AuthError::NoRefreshToken));

    // an expired record without a refresh token behaves the same
    seed(
        &cache,
        json!({ "access_token": "old", "expires_at": Utc::now().timestamp() - 1 }),
    )
    .await;
    let error = client.get_token(None).await.unwrap_err();
    assert_eq!(error.to_string(), "No refresh token available.");
}

#[tokio::test]
async fn test_token_endpoint_rejection_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string(r#"{"error":"invalid_grant"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = auth_client(&server, Arc::new(MemoryCache::new()));
    match client.get_token(Some("bad-code")).await.unwrap_err() {
        AuthError::TokenEndpoint {
            grant,
            status,
            body,
        } => {
            assert_eq!(grant, Grant::AuthorizationCode);
            assert_eq!(status, 403);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(client.token_store().load_stale().await.is_none());
}

#[tokio::test]
async fn test_undecodable_token_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = auth_client(&server, Arc::new(MemoryCache::new()));
    let error = client.exchange_code("code").await.unwrap_err();
    assert!(matches!(
        error,
        AuthError::InvalidTokenResponse {
            grant: Grant::AuthorizationCode,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unreachable_token_endpoint() {
    let config = ClientConfig::new("client-id", "client-secret", "https://app.example/callback")
        .with_base_url("http://127.0.0.1:9");
    let store = TokenStore::new(Arc::new(MemoryCache::new()), KEY);
    let client = AuthClient::new(config, store).unwrap();

    let error = client.get_token(Some("code")).await.unwrap_err();
    assert!(matches!(error, AuthError::Request { .. }));
}

#[tokio::test]
async fn test_logout_forgets_token() {
    let server = MockServer::start().await;
    let cache = Arc::new(MemoryCache::new());
    seed(
        &cache,
        json!({ "access_token": "A", "expires_at": Utc::now().timestamp() + 600 }),
    )
    .await;

    let client = auth_client(&server, cache);
    assert!(client.token_store().load().await.is_some());
    client.logout().await.unwrap();
    assert!(client.token_store().load_stale().await.is_none());
}

#[test]
fn test_client_rejects_incomplete_config() {
    let config = ClientConfig::new("", "secret", "https://app.example/callback");
    let store = TokenStore::new(Arc::new(MemoryCache::new()), KEY);
    assert!(AuthClient::new(config, store).is_err());
}
