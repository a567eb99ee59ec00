//! Trend topic collection.
//!
//! Queries the search provider per keyword and degrades every per-keyword
//! failure to a manual placeholder, so a non-empty keyword list always
//! yields at least one topic.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reel_models::{TopicSource, TrendTopic};
use tracing::{debug, info, warn};

use crate::metrics::record_fallback;
use crate::providers::{with_timeout, ProviderError, SearchItem, SearchProvider};

/// Keywords beyond this count are ignored.
pub const MAX_KEYWORDS: usize = 10;

/// Score given to manually synthesized topics.
pub const MANUAL_TOPIC_SCORE: f64 = 50.0;

/// Score of the most relevant provider result.
const TOP_RESULT_SCORE: f64 = 90.0;

/// Score lost per relevance rank.
const RANK_PENALTY: f64 = 5.0;

/// Provider results never score below this.
const MIN_RESULT_SCORE: f64 = 55.0;

/// Keyword used for the global fallback topic.
const GLOBAL_STUB_KEYWORD: &str = "trending";

/// Score for the provider result at 0-based `rank`.
pub fn rank_score(rank: usize) -> f64 {
    (TOP_RESULT_SCORE - RANK_PENALTY * rank as f64).max(MIN_RESULT_SCORE)
}

fn placeholder_topic(keyword: &str) -> TrendTopic {
    TrendTopic::manual(
        keyword,
        format!("Trending now: {}", keyword),
        format!("What everyone is talking about around {} right now.", keyword),
        MANUAL_TOPIC_SCORE,
    )
}

fn global_stub_topic() -> TrendTopic {
    TrendTopic::manual(
        GLOBAL_STUB_KEYWORD,
        "What's trending today",
        "A quick look at the stories everyone is watching today.",
        MANUAL_TOPIC_SCORE,
    )
}

fn topic_from_item(keyword: &str, rank: usize, item: SearchItem) -> TrendTopic {
    TrendTopic {
        id: item.id,
        keyword: keyword.to_string(),
        title: item.title,
        summary: item.description,
        source: TopicSource::Youtube,
        published_at: item.published_at,
        score: Some(rank_score(rank)),
    }
}

/// Collects candidate topics for a batch of keywords.
pub struct TopicCollector {
    provider: Option<Arc<dyn SearchProvider>>,
    timeout: Duration,
}

impl TopicCollector {
    /// Collector with no provider: every keyword falls back.
    pub fn new(timeout: Duration) -> Self {
        Self {
            provider: None,
            timeout,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn set_provider(&mut self, provider: Option<Arc<dyn SearchProvider>>) {
        self.provider = provider;
    }

    async fn search(&self, keyword: &str, max_results: u32) -> Result<Vec<SearchItem>, ProviderError> {
        match &self.provider {
            Some(provider) => with_timeout(self.timeout, provider.search(keyword, max_results)).await,
            None => Err(ProviderError::invalid_response("search provider not configured")),
        }
    }

    /// Collect topics, highest score first. Never empty.
    pub async fn collect(&self, keywords: &[String], max_per_keyword: u32) -> Vec<TrendTopic> {
        let mut topics: Vec<TrendTopic> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let keywords = keywords
            .iter()
            .take(MAX_KEYWORDS)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty());

        for keyword in keywords {
            match self.search(keyword, max_per_keyword).await {
                Ok(items) => {
                    debug!(keyword = %keyword, count = items.len(), "Collected search results");
                    for (rank, item) in items.into_iter().enumerate() {
                        if seen.insert(item.id.clone()) {
                            topics.push(topic_from_item(keyword, rank, item));
                        }
                    }
                }
                Err(e) => {
                    warn!(keyword = %keyword, "Search failed, using placeholder topic: {}", e);
                    record_fallback("collector");
                    let topic = placeholder_topic(keyword);
                    if seen.insert(topic.id.clone()) {
                        topics.push(topic);
                    }
                }
            }
        }

        if topics.is_empty() {
            info!("No topics collected, using global stub");
            topics.push(global_stub_topic());
        }

        // Vec::sort_by is stable, so equal scores keep insertion order
        topics.sort_by(|a, b| b.score_or_zero().total_cmp(&a.score_or_zero()));
        topics
    }
}
