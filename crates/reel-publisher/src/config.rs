//! OAuth and upload configuration.

use std::time::Duration;

use crate::auth_state::AUTH_STATE_TTL;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const YOUTUBE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";
const YOUTUBE_UPLOAD_SCOPE: &str = "https://www.googleapis.com/auth/youtube.upload";

/// Publishing account configuration.
///
/// Client id and secret are optional: their absence disables the
/// integration rather than failing startup.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client id
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// Redirect target registered with the provider
    pub redirect_uri: String,
    /// Authorization endpoint (browser redirect)
    pub auth_url: String,
    /// Token endpoint
    pub token_url: String,
    /// Multipart upload endpoint
    pub upload_url: String,
    /// Requested OAuth scope
    pub scope: String,
    /// Default privacy status for uploads
    pub privacy_status: String,
    /// Timeout for token endpoint calls
    pub timeout: Duration,
    /// Timeout for the upload request
    pub upload_timeout: Duration,
    /// How long an issued authorization `state` can be redeemed
    pub state_ttl: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:8000/api/youtube/callback".to_string(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            upload_url: YOUTUBE_UPLOAD_URL.to_string(),
            scope: YOUTUBE_UPLOAD_SCOPE.to_string(),
            privacy_status: "private".to_string(),
            timeout: Duration::from_secs(15),
            upload_timeout: Duration::from_secs(300),
            state_ttl: AUTH_STATE_TTL,
        }
    }
}

impl OAuthConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            client_id: non_empty_env("YOUTUBE_CLIENT_ID"),
            client_secret: non_empty_env("YOUTUBE_CLIENT_SECRET"),
            redirect_uri: non_empty_env("YOUTUBE_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            auth_url: defaults.auth_url,
            token_url: defaults.token_url,
            upload_url: defaults.upload_url,
            scope: defaults.scope,
            privacy_status: non_empty_env("YOUTUBE_PRIVACY_STATUS")
                .unwrap_or(defaults.privacy_status),
            timeout: Duration::from_secs(
                std::env::var("YOUTUBE_OAUTH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
            ),
            upload_timeout: Duration::from_secs(
                std::env::var("YOUTUBE_UPLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            state_ttl: defaults.state_ttl,
        }
    }

    /// Point every provider endpoint at `base` (used against mock servers).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{}/o/oauth2/v2/auth", base);
        self.token_url = format!("{}/token", base);
        self.upload_url = format!("{}/upload/youtube/v3/videos", base);
        self
    }

    /// Set client credentials.
    pub fn with_credentials(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Client id and secret, if both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
