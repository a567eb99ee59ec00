//! Tests for the account connector against a mock provider.

use std::sync::Arc;

use chrono::Utc;
use reel_models::OAuthTokenRecord;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::OAuthConfig;
use crate::connector::AccountConnector;
use crate::error::PublisherError;
use crate::store::{InMemoryTokenStore, TokenStore};
use crate::upload::{UploadMeta, MIN_VIDEO_BYTES};

// =============================================================================
// Test Helpers
// =============================================================================

const KEY: &str = "default";

fn test_config(server: &MockServer) -> OAuthConfig {
    OAuthConfig::default()
        .with_base_url(&server.uri())
        .with_credentials("client-id", "client-secret")
}

fn connector_with_store(config: OAuthConfig) -> (AccountConnector, Arc<InMemoryTokenStore>) {
    let store = Arc::new(InMemoryTokenStore::new());
    let connector = AccountConnector::new(config, store.clone()).unwrap();
    (connector, store)
}

async fn seed_token(store: &InMemoryTokenStore, access: &str, expires_in_ms: i64) {
    let record = OAuthTokenRecord::new(KEY, "refresh-1")
        .with_access_token(access, Utc::now().timestamp_millis() + expires_in_ms);
    store.put(record).await.unwrap();
}

async fn mount_refresh(server: &MockServer, access: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access,
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn video_file(size: usize) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    std::fs::write(file.path(), vec![7u8; size]).unwrap();
    file
}

// =============================================================================
// Code Exchange
// =============================================================================

#[tokio::test]
async fn test_exchange_stores_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (connector, store) = connector_with_store(test_config(&server));
    connector.exchange_code_and_store("auth-code", KEY).await.unwrap();

    let record = store.get(KEY).await.unwrap().unwrap();
    assert_eq!(record.refresh_token, "refresh-1");
    assert_eq!(record.access_token.as_deref(), Some("access-1"));
    assert!(connector.connection_status(KEY).await.connected);
}

#[tokio::test]
async fn test_exchange_without_refresh_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let (connector, store) = connector_with_store(test_config(&server));
    store.put(OAuthTokenRecord::new(KEY, "original")).await.unwrap();

    let err = connector.exchange_code_and_store("code", KEY).await.unwrap_err();
    assert!(matches!(err, PublisherError::MissingRefreshToken));
    assert_eq!(err.to_string(), "No refresh_token in response");

    // Prior record untouched
    let record = store.get(KEY).await.unwrap().unwrap();
    assert_eq!(record.refresh_token, "original");
    assert!(!connector.connection_status("other").await.connected);
}

#[tokio::test]
async fn test_exchange_rejected_code_surfaces_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Malformed auth code."
        })))
        .mount(&server)
        .await;

    let (connector, store) = connector_with_store(test_config(&server));
    let err = connector.exchange_code_and_store("bad", KEY).await.unwrap_err();

    assert!(matches!(err, PublisherError::TokenExchange(_)));
    assert!(err.to_string().contains("invalid_grant: Malformed auth code."));
    assert!(store.get(KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_exchange_unconfigured_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = OAuthConfig::default().with_base_url(&server.uri());
    let (connector, _store) = connector_with_store(config);

    let err = connector.exchange_code_and_store("code", KEY).await.unwrap_err();
    assert!(matches!(err, PublisherError::NotConfigured(_)));
}

// =============================================================================
// Auth URL / Status
// =============================================================================

#[tokio::test]
async fn test_auth_url_disabled_without_client_id() {
    let (connector, _) = connector_with_store(OAuthConfig::default());
    assert!(!connector.is_configured());
    assert!(connector.auth_url(KEY, None).is_none());
}

#[tokio::test]
async fn test_auth_url_generates_and_keeps_state() {
    let config = OAuthConfig::default().with_credentials("cid", "secret");
    let (connector, _) = connector_with_store(config);

    let generated = connector.auth_url(KEY, None).unwrap();
    assert!(!generated.state.is_empty());
    assert!(generated.url.contains(&format!("state={}", generated.state)));

    let supplied = connector.auth_url(KEY, Some("my-state")).unwrap();
    assert_eq!(supplied.state, "my-state");
}

async fn mount_exchange(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_authorization_state_binds_key_and_is_single_use() {
    let server = MockServer::start().await;
    mount_exchange(&server, 1).await;

    let (connector, store) = connector_with_store(test_config(&server));
    let auth = connector.auth_url("brand", None).unwrap();

    let key = connector
        .complete_authorization("auth-code", &auth.state)
        .await
        .unwrap();
    assert_eq!(key, "brand");
    assert!(store.get("brand").await.unwrap().is_some());
    assert!(store.get(KEY).await.unwrap().is_none());

    let err = connector
        .complete_authorization("auth-code", &auth.state)
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::InvalidState));
}

#[tokio::test]
async fn test_unknown_authorization_state_makes_no_request() {
    let server = MockServer::start().await;
    mount_exchange(&server, 0).await;

    let (connector, store) = connector_with_store(test_config(&server));
    connector.auth_url(KEY, Some("issued")).unwrap();

    let err = connector
        .complete_authorization("auth-code", "forged")
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::InvalidState));
    assert_eq!(err.to_string(), "Unknown or expired authorization state");
    assert!(store.list_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_authorization_state_is_rejected() {
    let server = MockServer::start().await;
    mount_exchange(&server, 0).await;

    let mut config = test_config(&server);
    config.state_ttl = std::time::Duration::ZERO;
    let (connector, _) = connector_with_store(config);
    let auth = connector.auth_url(KEY, None).unwrap();

    let err = connector
        .complete_authorization("auth-code", &auth.state)
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::InvalidState));
}

#[tokio::test]
async fn test_discarded_state_cannot_be_redeemed() {
    let server = MockServer::start().await;
    mount_exchange(&server, 0).await;

    let (connector, _) = connector_with_store(test_config(&server));
    let auth = connector.auth_url(KEY, None).unwrap();
    connector.discard_state(&auth.state);

    assert!(connector
        .complete_authorization("auth-code", &auth.state)
        .await
        .is_err());
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let (connector, store) = connector_with_store(OAuthConfig::default());
    store.put(OAuthTokenRecord::new(KEY, "r")).await.unwrap();

    connector.disconnect(KEY).await.unwrap();
    assert!(!connector.connection_status(KEY).await.connected);
    connector.disconnect(KEY).await.unwrap();
    connector.disconnect("never-connected").await.unwrap();
}

// =============================================================================
// Access Token Refresh
// =============================================================================

#[tokio::test]
async fn test_valid_token_is_not_refreshed() {
    let server = MockServer::start().await;
    mount_refresh(&server, "unused", 0).await;

    let (connector, store) = connector_with_store(test_config(&server));
    seed_token(&store, "cached", 10 * 60 * 1000).await;

    assert_eq!(connector.access_token(KEY).await.as_deref(), Some("cached"));
    assert_eq!(connector.access_token(KEY).await.as_deref(), Some("cached"));
}

#[tokio::test]
async fn test_expired_token_refreshes_once_and_caches() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh", 1).await;

    let (connector, store) = connector_with_store(test_config(&server));
    seed_token(&store, "stale", -1000).await;

    assert_eq!(connector.access_token(KEY).await.as_deref(), Some("fresh"));
    assert_eq!(connector.access_token(KEY).await.as_deref(), Some("fresh"));

    let record = store.get(KEY).await.unwrap().unwrap();
    assert_eq!(record.access_token.as_deref(), Some("fresh"));
    assert_eq!(record.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_token_inside_margin_is_refreshed() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh", 1).await;

    let (connector, store) = connector_with_store(test_config(&server));
    seed_token(&store, "almost-expired", 30 * 1000).await;

    assert_eq!(connector.access_token(KEY).await.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh", 1).await;

    let (connector, store) = connector_with_store(test_config(&server));
    seed_token(&store, "stale", -1000).await;
    let connector = Arc::new(connector);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let connector = Arc::clone(&connector);
            tokio::spawn(async move { connector.access_token(KEY).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().as_deref(), Some("fresh"));
    }
}

#[tokio::test]
async fn test_refresh_failure_returns_none_but_stays_connected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (connector, store) = connector_with_store(test_config(&server));
    seed_token(&store, "stale", -1000).await;

    assert!(connector.access_token(KEY).await.is_none());
    // No automatic retry: the next call tries once more
    assert!(connector.access_token(KEY).await.is_none());
    assert!(connector.connection_status(KEY).await.connected);
}

#[tokio::test]
async fn test_access_token_for_unknown_key() {
    let (connector, _) = connector_with_store(OAuthConfig::default());
    assert!(connector.access_token("missing").await.is_none());
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_requires_connection() {
    let (connector, _) = connector_with_store(OAuthConfig::default());
    let file = video_file(4096);

    let err = connector
        .upload_video(file.path(), &UploadMeta::new("t", "d"), KEY)
        .await
        .unwrap_err();
    assert!(err.is_not_connected());
    assert_eq!(err.to_string(), "YouTube account not connected or token expired");
}

#[tokio::test]
async fn test_upload_missing_file() {
    let (connector, store) = connector_with_store(OAuthConfig::default());
    seed_token(&store, "tok", 10 * 60 * 1000).await;

    let err = connector
        .upload_video(
            std::path::Path::new("/nonexistent/reel/video.mp4"),
            &UploadMeta::new("t", "d"),
            KEY,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Video file not found or not generated (pipeline stub)"
    );
}

#[tokio::test]
async fn test_upload_rejects_tiny_file() {
    let (connector, store) = connector_with_store(OAuthConfig::default());
    seed_token(&store, "tok", 10 * 60 * 1000).await;
    let file = video_file(10);

    let err = connector
        .upload_video(file.path(), &UploadMeta::new("t", "d"), KEY)
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::VideoTooSmall(10)));
}

#[tokio::test]
async fn test_upload_rejects_file_at_threshold() {
    let (connector, store) = connector_with_store(OAuthConfig::default());
    seed_token(&store, "tok", 10 * 60 * 1000).await;
    let file = video_file(MIN_VIDEO_BYTES as usize);

    let err = connector
        .upload_video(file.path(), &UploadMeta::new("t", "d"), KEY)
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::VideoTooSmall(1024)));
}

#[tokio::test]
async fn test_upload_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/youtube/v3/videos"))
        .and(query_param("uploadType", "multipart"))
        .and(query_param("part", "snippet,status"))
        .and(header("authorization", "Bearer tok"))
        .and(body_string_contains("\"categoryId\":\"22\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc123" })))
        .expect(1)
        .mount(&server)
        .await;

    let (connector, store) = connector_with_store(test_config(&server));
    seed_token(&store, "tok", 10 * 60 * 1000).await;
    let file = video_file(2048);

    let published = connector
        .upload_video(file.path(), &UploadMeta::new("My short", "desc"), KEY)
        .await
        .unwrap();
    assert_eq!(published.video_id, "abc123");
    assert_eq!(published.url, "https://www.youtube.com/shorts/abc123");
}

#[tokio::test]
async fn test_upload_http_error_is_descriptive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
        .mount(&server)
        .await;

    let (connector, store) = connector_with_store(test_config(&server));
    seed_token(&store, "tok", 10 * 60 * 1000).await;
    let file = video_file(2048);

    let err = connector
        .upload_video(file.path(), &UploadMeta::new("t", "d"), KEY)
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::UploadFailed(_)));
    assert!(err.to_string().contains("HTTP 403: quotaExceeded"));
}

#[tokio::test]
async fn test_upload_response_without_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "youtube#video" })))
        .mount(&server)
        .await;

    let (connector, store) = connector_with_store(test_config(&server));
    seed_token(&store, "tok", 10 * 60 * 1000).await;
    let file = video_file(2048);

    let err = connector
        .upload_video(file.path(), &UploadMeta::new("t", "d"), KEY)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing video id"));
}
