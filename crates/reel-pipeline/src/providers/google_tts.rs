//! Google Cloud Text-to-Speech provider.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{http_client, read_success_body, ProviderError, ProviderResult, TtsProvider};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

/// Synthesizes MP3 narration via `text:synthesize`.
pub struct GoogleTtsProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GoogleTtsProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl TtsProvider for GoogleTtsProvider {
    async fn synthesize(&self, text: &str, language: &str) -> ProviderResult<Vec<u8>> {
        let body = json!({
            "input": { "text": text },
            "voice": { "languageCode": language },
            "audioConfig": { "audioEncoding": "MP3" }
        });

        let response = self
            .client
            .post(format!("{}/v1/text:synthesize", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let text = read_success_body(response).await?;
        let parsed: SynthesizeResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::invalid_response(format!("tts response: {}", e)))?;

        let encoded = parsed
            .audio_content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ProviderError::invalid_response("tts response missing audioContent"))?;

        STANDARD
            .decode(encoded)
            .map_err(|e| ProviderError::invalid_response(format!("audioContent not base64: {}", e)))
    }
}
