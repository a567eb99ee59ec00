//! Shared data models for the Reel pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Trend topics and scripts
//! - Per-scene media references and the assembled video artifact
//! - Pipeline jobs and their state machine
//! - OAuth token records for connected publishing accounts

pub mod job;
pub mod media;
pub mod script;
pub mod token;
pub mod topic;

// Re-export common types
pub use job::{Job, JobId, JobStatus};
pub use media::{PublishedVideo, SceneAudio, SceneImage, VideoArtifact};
pub use script::{SceneKind, Script, ScriptError, ScriptScene};
pub use token::OAuthTokenRecord;
pub use topic::{TopicSource, TrendTopic};
