//! Trend-to-short video pipeline.
//!
//! This crate provides:
//! - Stage components: topic collection, script composition, scene
//!   rendering, narration and video assembly
//! - HTTP clients for the search, image and TTS providers
//! - A job store abstraction and the orchestrator that drives each job
//!   through its stages

pub mod assembler;
pub mod collector;
pub mod composer;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod narration;
pub mod orchestrator;
pub mod providers;
pub mod renderer;
pub mod store;
pub mod text;


pub use assembler::{PlaceholderAssembler, VideoAssembler};
pub use collector::TopicCollector;
pub use composer::compose;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::JobLogger;
pub use narration::NarrationSynthesizer;
pub use orchestrator::{JobOrchestrator, RunOptions, STUB_VIDEO_ID, STUB_VIDEO_URL};
pub use providers::{ImageProvider, ProviderConfig, ProviderError, SearchProvider, TtsProvider};
pub use renderer::SceneRenderer;
pub use store::{InMemoryJobStore, JobStore};
