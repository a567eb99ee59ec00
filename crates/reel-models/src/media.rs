//! Per-scene media references and pipeline artifacts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Image rendered (or substituted) for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneImage {
    pub scene_index: u32,
    pub image_url: String,
    /// True when the provider was skipped or failed
    #[serde(default)]
    pub placeholder: bool,
}

/// Narration audio for one scene; `None` when synthesis was skipped or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneAudio {
    pub scene_index: u32,
    pub audio_path: Option<PathBuf>,
}

/// Output of the video assembly stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoArtifact {
    pub video_path: PathBuf,
    pub thumbnail_path: String,
    pub duration_seconds: u32,
}

/// A video accepted by the publishing platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedVideo {
    pub video_id: String,
    pub url: String,
}
