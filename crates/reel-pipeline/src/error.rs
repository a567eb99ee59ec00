//! Pipeline error types.

use thiserror::Error;

use reel_models::{JobId, JobStatus, ScriptError};
use reel_publisher::PublisherError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Topic collection returned no topics")]
    NoTopics,

    #[error("Invalid script: {0}")]
    Script(#[from] ScriptError),

    #[error("Video assembly failed: {0}")]
    Assembly(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Job {0} is already finished")]
    JobTerminal(JobId),

    #[error("Job store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Job cancelled")]
    Cancelled,

    #[error(transparent)]
    Publisher(#[from] PublisherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if error came from a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publisher_errors_keep_their_message() {
        let err: PipelineError = PublisherError::VideoNotFound.into();
        assert_eq!(
            err.to_string(),
            "Video file not found or not generated (pipeline stub)"
        );
    }

    #[test]
    fn test_cancelled() {
        assert!(PipelineError::Cancelled.is_cancelled());
        assert!(!PipelineError::NoTopics.is_cancelled());
    }
}
