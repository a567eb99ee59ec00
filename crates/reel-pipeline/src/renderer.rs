//! Scene image rendering.

use std::sync::Arc;
use std::time::Duration;

use reel_models::{SceneImage, Script};
use tracing::{debug, warn};

use crate::composer::DEFAULT_CHARACTER;
use crate::metrics::record_fallback;
use crate::providers::{with_timeout, ImageProvider};
use crate::text::cap_chars;

/// Prompt characters carried into the placeholder URL.
pub const PLACEHOLDER_PROMPT_CHARS: usize = 60;

const PLACEHOLDER_BASE: &str = "https://placehold.co/1080x1920/png?text=";

/// Deterministic placeholder image URL for `prompt`.
pub fn placeholder_url(prompt: &str) -> String {
    let text = cap_chars(prompt, PLACEHOLDER_PROMPT_CHARS);
    format!("{}{}", PLACEHOLDER_BASE, urlencoding::encode(&text))
}

/// Renders one image per scene, substituting placeholders on any failure.
pub struct SceneRenderer {
    provider: Option<Arc<dyn ImageProvider>>,
    timeout: Duration,
}

impl SceneRenderer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            provider: None,
            timeout,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn set_provider(&mut self, provider: Option<Arc<dyn ImageProvider>>) {
        self.provider = provider;
    }

    /// One image per scene in scene order. Never fails.
    pub async fn render(&self, script: &Script, character_hint: Option<&str>) -> Vec<SceneImage> {
        let character = character_hint
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(if script.character.is_empty() {
                DEFAULT_CHARACTER
            } else {
                script.character.as_str()
            });

        let mut images = Vec::with_capacity(script.scenes.len());
        for scene in &script.scenes {
            let prompt = format!("{}, {}", character, scene.image_prompt);
            images.push(self.render_one(scene.scene_index, &prompt).await);
        }
        images
    }

    async fn render_one(&self, scene_index: u32, prompt: &str) -> SceneImage {
        if let Some(provider) = &self.provider {
            match with_timeout(self.timeout, provider.generate(prompt)).await {
                Ok(url) => {
                    debug!(scene_index, "Scene image generated");
                    return SceneImage {
                        scene_index,
                        image_url: url,
                        placeholder: false,
                    };
                }
                Err(e) => {
                    warn!(scene_index, "Image generation failed, using placeholder: {}", e);
                    record_fallback("renderer");
                }
            }
        }

        SceneImage {
            scene_index,
            image_url: placeholder_url(prompt),
            placeholder: true,
        }
    }
}
