//! Scripts and their scenes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a scene within the fixed script shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    Hook,
    Body,
    CallToAction,
}

/// One scene of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptScene {
    /// 1-based, contiguous within a script
    pub scene_index: u32,
    pub kind: SceneKind,
    /// Narration / on-screen text
    pub text: String,
    /// Scene-specific image prompt (without the character hint)
    pub image_prompt: String,
    pub duration_seconds: u32,
}

/// A script produced from one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub topic_id: String,
    pub topic_title: String,
    pub hook: String,
    pub character: String,
    pub scenes: Vec<ScriptScene>,
    /// Always the sum of scene durations
    pub total_duration_seconds: u32,
}

/// Script invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Script has no scenes")]
    Empty,

    #[error("Scene index {found} out of order, expected {expected}")]
    NonContiguous { expected: u32, found: u32 },

    #[error("Total duration {declared}s does not match scene sum {actual}s")]
    DurationMismatch { declared: u32, actual: u32 },
}

impl Script {
    /// Build a script, deriving the total duration from the scenes.
    pub fn new(
        topic_id: impl Into<String>,
        topic_title: impl Into<String>,
        hook: impl Into<String>,
        character: impl Into<String>,
        scenes: Vec<ScriptScene>,
    ) -> Self {
        let total_duration_seconds = Self::sum_durations(&scenes);
        Self {
            topic_id: topic_id.into(),
            topic_title: topic_title.into(),
            hook: hook.into(),
            character: character.into(),
            scenes,
            total_duration_seconds,
        }
    }

    fn sum_durations(scenes: &[ScriptScene]) -> u32 {
        scenes.iter().map(|s| s.duration_seconds).sum()
    }

    /// Check scene ordering and the duration invariant.
    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.scenes.is_empty() {
            return Err(ScriptError::Empty);
        }

        for (i, scene) in self.scenes.iter().enumerate() {
            let expected = i as u32 + 1;
            if scene.scene_index != expected {
                return Err(ScriptError::NonContiguous {
                    expected,
                    found: scene.scene_index,
                });
            }
        }

        let actual = Self::sum_durations(&self.scenes);
        if actual != self.total_duration_seconds {
            return Err(ScriptError::DurationMismatch {
                declared: self.total_duration_seconds,
                actual,
            });
        }

        Ok(())
    }
}
