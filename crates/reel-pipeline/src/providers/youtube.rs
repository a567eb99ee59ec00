//! YouTube Data API search provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, read_success_body, ProviderError, ProviderResult, SearchItem, SearchProvider};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: ResultId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<DateTime<Utc>>,
}

/// Searches videos by keyword, ordered by relevance.
pub struct YoutubeSearchProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl YoutubeSearchProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl SearchProvider for YoutubeSearchProvider {
    async fn search(&self, keyword: &str, max_results: u32) -> ProviderResult<Vec<SearchItem>> {
        let url = format!("{}/youtube/v3/search", self.base_url);
        let max_results = max_results.clamp(1, 50).to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("order", "relevance"),
                ("q", keyword),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let text = read_success_body(response).await?;
        let body: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::invalid_response(format!("search response: {}", e)))?;

        let items: Vec<SearchItem> = body
            .items
            .into_iter()
            .filter_map(|r| {
                let id = r.id.video_id.filter(|id| !id.is_empty())?;
                let snippet = r.snippet?;
                Some(SearchItem {
                    id,
                    title: snippet.title,
                    description: snippet.description,
                    published_at: snippet.published_at,
                })
            })
            .collect();

        debug!(keyword = %keyword, count = items.len(), "Search returned items");
        Ok(items)
    }
}
