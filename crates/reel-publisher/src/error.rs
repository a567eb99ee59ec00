//! Publisher error types.

use thiserror::Error;

/// Result type for publisher operations.
pub type PublisherResult<T> = Result<T, PublisherError>;

/// Errors that can occur while connecting an account or uploading.
#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("OAuth not configured: {0}")]
    NotConfigured(String),

    #[error("Unknown or expired authorization state")]
    InvalidState,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("No refresh_token in response")]
    MissingRefreshToken,

    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("YouTube account not connected or token expired")]
    NotConnected,

    #[error("Video file not found or not generated (pipeline stub)")]
    VideoNotFound,

    #[error("Video file too small ({0} bytes)")]
    VideoTooSmall(u64),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Token store error: {0}")]
    Store(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PublisherError {
    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured(msg.into())
    }

    pub fn token_exchange(msg: impl Into<String>) -> Self {
        Self::TokenExchange(msg.into())
    }

    pub fn token_refresh(msg: impl Into<String>) -> Self {
        Self::TokenRefresh(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// True when no usable access token could be obtained for the account.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, PublisherError::NotConnected)
    }
}
