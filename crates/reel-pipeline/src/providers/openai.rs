//! OpenAI image generation provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{http_client, read_success_body, ImageProvider, ProviderError, ProviderResult};

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// Generates one image per prompt via `/v1/images/generations`.
pub struct OpenAiImageProvider {
    api_key: String,
    base_url: String,
    model: String,
    size: String,
    client: Client,
}

impl OpenAiImageProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        size: String,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            size,
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let request = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let text = read_success_body(response).await?;
        let body: ImageResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::invalid_response(format!("image response: {}", e)))?;

        body.data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ProviderError::invalid_response("image response missing data[0].url"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiImageProvider {
        OpenAiImageProvider::new(
            "sk-test".into(),
            server.uri(),
            "dall-e-3".into(),
            "1024x1792".into(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_first_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({ "prompt": "a cat", "n": 1, "size": "1024x1792" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "url": "https://img.example/1.png" }]
            })))
            .mount(&server)
            .await;

        let url = provider(&server).generate("a cat").await.unwrap();
        assert_eq!(url, "https://img.example/1.png");
    }

    #[tokio::test]
    async fn test_generate_without_data_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        let err = provider(&server).generate("a cat").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
