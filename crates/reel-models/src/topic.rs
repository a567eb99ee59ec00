//! Trend topics collected at the start of a pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Where a topic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicSource {
    /// Returned by the YouTube search provider
    Youtube,
    /// Synthesized locally when the provider was unavailable
    Manual,
}

impl TopicSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicSource::Youtube => "youtube",
            TopicSource::Manual => "manual",
        }
    }
}

/// A candidate topic for a short video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendTopic {
    /// Provider item id, or `manual-<hash>` for synthesized topics
    pub id: String,
    /// Keyword that produced this topic
    pub keyword: String,
    pub title: String,
    pub summary: String,
    pub source: TopicSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl TrendTopic {
    /// Create a manually synthesized topic with a deterministic id.
    pub fn manual(
        keyword: impl Into<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
        score: f64,
    ) -> Self {
        let keyword = keyword.into();
        let title = title.into();
        Self {
            id: Self::manual_id(&title, &keyword),
            keyword,
            title,
            summary: summary.into(),
            source: TopicSource::Manual,
            published_at: None,
            score: Some(score),
        }
    }

    /// Deterministic id for a manual topic: `manual-` plus the first 16 hex
    /// chars of SHA-256 over title and keyword.
    pub fn manual_id(title: &str, keyword: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update([0x1f]);
        hasher.update(keyword.as_bytes());
        let digest = hasher.finalize();

        let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
        format!("manual-{}", hex)
    }

    /// Score used for ordering; unscored topics sort last.
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_id_is_deterministic() {
        let a = TrendTopic::manual_id("Cats", "pets");
        let b = TrendTopic::manual_id("Cats", "pets");
        assert_eq!(a, b);
        assert!(a.starts_with("manual-"));
        assert_eq!(a.len(), "manual-".len() + 16);
    }

    #[test]
    fn test_manual_id_separates_title_and_keyword() {
        assert_ne!(
            TrendTopic::manual_id("ab", "c"),
            TrendTopic::manual_id("a", "bc")
        );
    }

    #[test]
    fn test_source_serializes_snake_case() {
        let topic = TrendTopic::manual("rust", "Rust news", "", 50.0);
        let json = serde_json::to_value(&topic).unwrap();
        assert_eq!(json["source"], "manual");
        assert!(json.get("published_at").is_none());
    }
}
