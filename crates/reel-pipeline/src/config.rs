//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search results requested per keyword
    pub max_per_keyword: u32,
    /// Directory for assembled artifacts
    pub work_dir: PathBuf,
    /// Upper bound on any single provider call
    pub provider_timeout: Duration,
    /// Character/style hint used when a run does not supply one
    pub default_character: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_per_keyword: 5,
            work_dir: std::env::temp_dir().join("reel"),
            provider_timeout: Duration::from_secs(20),
            default_character: crate::composer::DEFAULT_CHARACTER.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_per_keyword: std::env::var("PIPELINE_MAX_PER_KEYWORD")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_per_keyword),
            work_dir: std::env::var("PIPELINE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            provider_timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
            default_character: std::env::var("PIPELINE_DEFAULT_CHARACTER")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.default_character),
        }
    }
}
