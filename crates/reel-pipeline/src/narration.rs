//! Narration synthesis.
//!
//! Optional stage: failures only blank out the affected scene.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reel_models::{SceneAudio, ScriptScene};
use tracing::{debug, warn};

use crate::metrics::record_fallback;
use crate::providers::{with_timeout, ProviderResult, TtsProvider};
use crate::text::cap_chars;

/// Narration text is capped to this many characters.
pub const MAX_NARRATION_CHARS: usize = 500;

/// Synthesizes per-scene narration audio to temp files.
pub struct NarrationSynthesizer {
    provider: Option<Arc<dyn TtsProvider>>,
    language: String,
    timeout: Duration,
}

impl NarrationSynthesizer {
    pub fn new(language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider: None,
            language: language.into(),
            timeout,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn TtsProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn set_provider(&mut self, provider: Option<Arc<dyn TtsProvider>>) {
        self.provider = provider;
    }

    /// One entry per scene in scene order.
    pub async fn synthesize(&self, scenes: &[ScriptScene]) -> Vec<SceneAudio> {
        let mut audio = Vec::with_capacity(scenes.len());
        for scene in scenes {
            let audio_path = self.synthesize_one(scene).await;
            audio.push(SceneAudio {
                scene_index: scene.scene_index,
                audio_path,
            });
        }
        audio
    }

    async fn synthesize_one(&self, scene: &ScriptScene) -> Option<PathBuf> {
        let text = cap_chars(scene.text.trim(), MAX_NARRATION_CHARS);
        if text.is_empty() {
            return None;
        }
        let provider = self.provider.as_ref()?;

        let result = match with_timeout(self.timeout, provider.synthesize(&text, &self.language)).await {
            Ok(bytes) => write_audio(bytes).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(path) => {
                debug!(scene_index = scene.scene_index, path = %path.display(), "Narration written");
                Some(path)
            }
            Err(e) => {
                warn!(scene_index = scene.scene_index, "Narration failed: {}", e);
                record_fallback("narration");
                None
            }
        }
    }
}

/// Persist audio bytes to a new temp file that outlives this call.
async fn write_audio(bytes: Vec<u8>) -> ProviderResult<PathBuf> {
    let path = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix("reel-narration-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(&bytes)?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        Ok(path)
    })
    .await
    .map_err(std::io::Error::other)??;
    Ok(path)
}
