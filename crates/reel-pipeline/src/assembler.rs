//! Video assembly.
//!
//! Assembly sits behind a trait so a real encoder can replace the
//! placeholder without touching the orchestrator.

use std::path::PathBuf;

use async_trait::async_trait;
use reel_models::{SceneAudio, SceneImage, Script, VideoArtifact};
use tracing::debug;

use crate::error::PipelineResult;

/// Combines scene images and narration into a video artifact.
///
/// Implementations must report `duration_seconds` equal to
/// `script.total_duration_seconds` and return a `video_path` that can be
/// reopened later.
#[async_trait]
pub trait VideoAssembler: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn assemble(
        &self,
        script: &Script,
        images: &[SceneImage],
        narration: &[SceneAudio],
    ) -> PipelineResult<VideoArtifact>;
}

/// Keep only characters safe in a file name.
pub fn sanitize_file_stem(s: &str) -> String {
    let stem: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "video".to_string()
    } else {
        stem
    }
}

/// Names the artifact without encoding anything.
///
/// The returned path is not written, so uploading it fails with
/// "video not found" unless something else produces the file.
#[derive(Debug, Clone)]
pub struct PlaceholderAssembler {
    work_dir: PathBuf,
}

impl PlaceholderAssembler {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }
}

#[async_trait]
impl VideoAssembler for PlaceholderAssembler {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn assemble(
        &self,
        script: &Script,
        images: &[SceneImage],
        narration: &[SceneAudio],
    ) -> PipelineResult<VideoArtifact> {
        let video_path = self
            .work_dir
            .join(format!("{}.mp4", sanitize_file_stem(&script.topic_id)));
        let thumbnail_path = images.first().map(|i| i.image_url.clone()).unwrap_or_default();

        debug!(
            path = %video_path.display(),
            images = images.len(),
            narrated = narration.iter().filter(|a| a.audio_path.is_some()).count(),
            "Placeholder video assembled"
        );

        Ok(VideoArtifact {
            video_path,
            thumbnail_path,
            duration_seconds: script.total_duration_seconds,
        })
    }
}
