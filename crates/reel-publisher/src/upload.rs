//! Multipart video upload.

use reel_models::PublishedVideo;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::OAuthConfig;
use crate::error::{PublisherError, PublisherResult};

/// Maximum title length accepted by the platform.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum description length accepted by the platform.
pub const MAX_DESCRIPTION_CHARS: usize = 5000;

/// Content category for every upload ("People & Blogs").
pub const CATEGORY_ID: &str = "22";

/// Files not larger than this are treated as stub artifacts.
pub const MIN_VIDEO_BYTES: u64 = 1024;

/// Metadata attached to an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadMeta {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Overrides the configured default privacy status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<String>,
}

impl UploadMeta {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            privacy_status: None,
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Client for the platform's multipart upload endpoint.
#[derive(Clone)]
pub struct VideoUploader {
    http: Client,
    upload_url: String,
    default_privacy: String,
}

impl VideoUploader {
    pub fn new(config: &OAuthConfig) -> PublisherResult<Self> {
        let http = Client::builder()
            .timeout(config.upload_timeout)
            .user_agent(concat!("reel-publisher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PublisherError::Network)?;

        Ok(Self {
            http,
            upload_url: config.upload_url.clone(),
            default_privacy: config.privacy_status.clone(),
        })
    }

    /// JSON metadata part with title/description capped to platform limits.
    pub fn metadata_json(&self, meta: &UploadMeta) -> serde_json::Value {
        let privacy = meta
            .privacy_status
            .as_deref()
            .unwrap_or(self.default_privacy.as_str());

        json!({
            "snippet": {
                "title": truncate_chars(&meta.title, MAX_TITLE_CHARS),
                "description": truncate_chars(&meta.description, MAX_DESCRIPTION_CHARS),
                "categoryId": CATEGORY_ID,
            },
            "status": {
                "privacyStatus": privacy,
            }
        })
    }

    /// Submit the video bytes with metadata as one `multipart/related` request.
    pub async fn upload(
        &self,
        access_token: &str,
        video: Vec<u8>,
        meta: &UploadMeta,
    ) -> PublisherResult<PublishedVideo> {
        let boundary = format!("reel-{}", Uuid::new_v4().simple());
        let metadata = serde_json::to_vec(&self.metadata_json(meta))?;
        let body = multipart_related_body(&boundary, &metadata, &video);

        debug!(bytes = video.len(), "Submitting video upload");

        let response = self
            .http
            .post(&self.upload_url)
            .query(&[("part", "snippet,status"), ("uploadType", "multipart")])
            .bearer_auth(access_token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| PublisherError::upload_failed(format!("request error: {}", e)))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(PublisherError::upload_failed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate_chars(&text, 300)
            )));
        }

        let video_id = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(str::to_string))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PublisherError::upload_failed("response missing video id"))?;

        info!(video_id = %video_id, "Video uploaded");
        Ok(PublishedVideo {
            url: format!("https://www.youtube.com/shorts/{}", video_id),
            video_id,
        })
    }
}

/// Build a two-part `multipart/related` body: JSON metadata, then the video.
fn multipart_related_body(boundary: &str, metadata: &[u8], video: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(video.len() + metadata.len() + 256);

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: video/mp4\r\n\r\n");
    body.extend_from_slice(video);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    body
}
