//! Account connector: OAuth lifecycle and authenticated upload per key.

use std::path::Path;
use std::sync::Arc;

use reel_models::PublishedVideo;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth_state::{AuthStateRegistry, MAX_PENDING_STATES};
use crate::config::OAuthConfig;
use crate::error::{PublisherError, PublisherResult};
use crate::metrics::record_upload;
use crate::oauth::OAuthClient;
use crate::store::{InMemoryTokenStore, TokenStore};
use crate::token_cache::TokenCache;
use crate::upload::{UploadMeta, VideoUploader, MIN_VIDEO_BYTES};

/// Connector key used when the caller does not name an account.
pub const DEFAULT_CONNECTOR_KEY: &str = "default";

/// Authorization redirect for the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUrl {
    pub url: String,
    pub state: String,
}

/// Whether a key has a stored refresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
}

/// Owns OAuth state for publishing accounts, one per opaque key.
///
/// A key is connected from a successful code exchange until `disconnect`.
/// Failed refreshes do not disconnect it; they only make `access_token`
/// return `None`.
pub struct AccountConnector {
    oauth: OAuthClient,
    tokens: TokenCache,
    uploader: VideoUploader,
    states: AuthStateRegistry,
}

impl AccountConnector {
    /// Create a connector over the given token store.
    pub fn new(config: OAuthConfig, store: Arc<dyn TokenStore>) -> PublisherResult<Self> {
        let oauth = OAuthClient::new(config.clone())?;
        let uploader = VideoUploader::new(&config)?;
        let tokens = TokenCache::new(store, oauth.clone());
        let states = AuthStateRegistry::new(config.state_ttl, MAX_PENDING_STATES);

        Ok(Self {
            oauth,
            tokens,
            uploader,
            states,
        })
    }

    /// Create a connector with a process-local token store.
    pub fn in_memory(config: OAuthConfig) -> PublisherResult<Self> {
        Self::new(config, Arc::new(InMemoryTokenStore::new()))
    }

    /// Create a connector from environment variables.
    pub fn from_env() -> PublisherResult<Self> {
        Self::in_memory(OAuthConfig::from_env())
    }

    pub fn config(&self) -> &OAuthConfig {
        self.oauth.config()
    }

    /// Whether the integration has a client id.
    pub fn is_configured(&self) -> bool {
        self.config().client_id.is_some()
    }

    /// Build the authorization URL for connecting `key`. `None` means the
    /// integration is disabled.
    ///
    /// The returned `state` is remembered for `key` until its callback
    /// arrives or it expires.
    pub fn auth_url(&self, key: &str, state: Option<&str>) -> Option<AuthUrl> {
        let state = state
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        match self.oauth.authorization_url(&state) {
            Ok(Some(url)) => {
                self.states.issue(&state, key);
                Some(AuthUrl { url, state })
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Cannot build authorization url: {}", e);
                None
            }
        }
    }

    /// Redeem an authorization callback: consume `state`, then exchange
    /// `code` for the key the state was issued to. Returns that key.
    ///
    /// Unknown, reused and expired states fail with `InvalidState` before
    /// any request is made.
    pub async fn complete_authorization(&self, code: &str, state: &str) -> PublisherResult<String> {
        let Some(key) = self.states.consume(state) else {
            warn!("Rejected authorization callback with unknown state");
            return Err(PublisherError::InvalidState);
        };

        self.exchange_code_and_store(code, &key).await?;
        Ok(key)
    }

    /// Forget an issued state, e.g. after the user denied access.
    pub fn discard_state(&self, state: &str) {
        let _ = self.states.consume(state);
    }

    /// Exchange an authorization code and store the resulting refresh token
    /// under `key`, replacing any prior record. Nothing is stored on error.
    pub async fn exchange_code_and_store(&self, code: &str, key: &str) -> PublisherResult<()> {
        let tokens = match self.oauth.exchange_code(code).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(key = %key, "Authorization code exchange failed: {}", e);
                return Err(e);
            }
        };

        self.tokens
            .store_exchanged(key, tokens.refresh_token, tokens.access_token, tokens.expires_in)
            .await?;

        info!(key = %key, "Publishing account connected");
        Ok(())
    }

    /// Current access token for `key`, refreshed if within the safety margin.
    ///
    /// Returns `None` when the key is not connected or the refresh failed.
    /// Refresh failures are not retried.
    pub async fn access_token(&self, key: &str) -> Option<String> {
        match self.tokens.get_token(key).await {
            Ok(token) => Some(token),
            Err(PublisherError::NotConnected) => None,
            Err(e) => {
                warn!(key = %key, "No usable access token: {}", e);
                None
            }
        }
    }

    /// Upload a video file for the account under `key`.
    ///
    /// Preconditions are checked in order: token, file presence, file size.
    pub async fn upload_video(
        &self,
        video_path: &Path,
        meta: &UploadMeta,
        key: &str,
    ) -> PublisherResult<PublishedVideo> {
        let result = self.try_upload(video_path, meta, key).await;
        match &result {
            Ok(_) => record_upload("success"),
            Err(PublisherError::NotConnected) => record_upload("not_connected"),
            Err(_) => record_upload("failure"),
        }
        result
    }

    async fn try_upload(
        &self,
        video_path: &Path,
        meta: &UploadMeta,
        key: &str,
    ) -> PublisherResult<PublishedVideo> {
        let access_token = self
            .access_token(key)
            .await
            .ok_or(PublisherError::NotConnected)?;

        let size = match tokio::fs::metadata(video_path).await {
            Ok(m) if m.is_file() => m.len(),
            _ => return Err(PublisherError::VideoNotFound),
        };
        if size <= MIN_VIDEO_BYTES {
            return Err(PublisherError::VideoTooSmall(size));
        }

        let bytes = tokio::fs::read(video_path)
            .await
            .map_err(|_| PublisherError::VideoNotFound)?;

        self.uploader.upload(&access_token, bytes, meta).await
    }

    /// Whether `key` has a stored record.
    pub async fn connection_status(&self, key: &str) -> ConnectionStatus {
        let connected = match self.tokens.store().get(key).await {
            Ok(record) => record.is_some(),
            Err(e) => {
                warn!(key = %key, "Token store lookup failed: {}", e);
                false
            }
        };
        ConnectionStatus { connected }
    }

    /// Remove the stored record for `key`. Idempotent.
    pub async fn disconnect(&self, key: &str) -> PublisherResult<()> {
        if self.tokens.remove(key).await? {
            info!(key = %key, "Publishing account disconnected");
        }
        Ok(())
    }
}
