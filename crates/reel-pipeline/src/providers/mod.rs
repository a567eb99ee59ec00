//! External content providers.
//!
//! Each stage talks to its provider through a narrow trait so tests and
//! alternative vendors can be swapped in without touching the stages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod google_tts;
pub mod openai;
pub mod youtube;

pub use google_tts::GoogleTtsProvider;
pub use openai::OpenAiImageProvider;
pub use youtube::YoutubeSearchProvider;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Provider call failures. Stages degrade all of these to fallbacks.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP {0}: {1}")]
    Http(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Trend search, most relevant first.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, keyword: &str, max_results: u32) -> ProviderResult<Vec<SearchItem>>;
}

/// Text-to-image generation. Returns the image URL.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> ProviderResult<String>;
}

/// Text-to-speech. Returns encoded audio bytes.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> ProviderResult<Vec<u8>>;
}

/// Run `fut` under `timeout`, mapping expiry to `ProviderError::Timeout`.
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> ProviderResult<T>
where
    F: std::future::Future<Output = ProviderResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Provider credentials and endpoints. A missing key disables that provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub youtube_api_key: Option<String>,
    pub youtube_api_base: String,
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub openai_image_model: String,
    pub openai_image_size: String,
    pub google_tts_api_key: Option<String>,
    pub google_tts_base: String,
    pub tts_language: String,
    /// HTTP client timeout for every provider
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            youtube_api_base: "https://www.googleapis.com".to_string(),
            openai_api_key: None,
            openai_api_base: "https://api.openai.com".to_string(),
            openai_image_model: "dall-e-3".to_string(),
            openai_image_size: "1024x1792".to_string(),
            google_tts_api_key: None,
            google_tts_base: "https://texttospeech.googleapis.com".to_string(),
            tts_language: "en-US".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl ProviderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            youtube_api_key: non_empty_env("YOUTUBE_API_KEY"),
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_image_model: non_empty_env("OPENAI_IMAGE_MODEL")
                .unwrap_or(defaults.openai_image_model),
            google_tts_api_key: non_empty_env("GOOGLE_TTS_API_KEY"),
            tts_language: non_empty_env("TTS_LANGUAGE").unwrap_or(defaults.tts_language),
            timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
            ..defaults
        }
    }

    /// Search provider, if an API key is configured.
    pub fn search_provider(&self) -> ProviderResult<Option<Arc<dyn SearchProvider>>> {
        match &self.youtube_api_key {
            Some(key) => Ok(Some(Arc::new(YoutubeSearchProvider::new(
                key.clone(),
                self.youtube_api_base.clone(),
                self.timeout,
            )?))),
            None => Ok(None),
        }
    }

    /// Image provider, if an API key is configured.
    pub fn image_provider(&self) -> ProviderResult<Option<Arc<dyn ImageProvider>>> {
        match &self.openai_api_key {
            Some(key) => Ok(Some(Arc::new(OpenAiImageProvider::new(
                key.clone(),
                self.openai_api_base.clone(),
                self.openai_image_model.clone(),
                self.openai_image_size.clone(),
                self.timeout,
            )?))),
            None => Ok(None),
        }
    }

    /// TTS provider, if an API key is configured.
    pub fn tts_provider(&self) -> ProviderResult<Option<Arc<dyn TtsProvider>>> {
        match &self.google_tts_api_key {
            Some(key) => Ok(Some(Arc::new(GoogleTtsProvider::new(
                key.clone(),
                self.google_tts_base.clone(),
                self.timeout,
            )?))),
            None => Ok(None),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn http_client(timeout: Duration) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("reel-pipeline/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::Network)
}

/// Read a response body, failing on non-2xx with a short excerpt.
pub(crate) async fn read_success_body(response: reqwest::Response) -> ProviderResult<String> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        let excerpt: String = text.chars().take(200).collect();
        return Err(ProviderError::Http(status.as_u16(), excerpt));
    }
    Ok(text)
}
