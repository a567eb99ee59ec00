//! Script composition.
//!
//! Turns a topic into the fixed hook / body / call-to-action shape. Pure and
//! infallible: every topic yields a valid script.

use reel_models::{SceneKind, Script, ScriptScene, TrendTopic};

use crate::text::truncate_with_ellipsis;

/// Character used when the caller gives no hint.
pub const DEFAULT_CHARACTER: &str = "friendly cartoon presenter";

/// Maximum hook length in characters.
pub const HOOK_MAX_CHARS: usize = 40;

/// Maximum body length in characters.
pub const BODY_MAX_CHARS: usize = 220;

pub const HOOK_SECONDS: u32 = 3;
pub const BODY_SECONDS: u32 = 8;
pub const CTA_SECONDS: u32 = 4;

fn resolve_character(hint: Option<&str>) -> String {
    hint.map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or(DEFAULT_CHARACTER)
        .to_string()
}

/// Compose the three-scene script for `topic`.
pub fn compose(topic: &TrendTopic, character_hint: Option<&str>) -> Script {
    let character = resolve_character(character_hint);

    let hook = truncate_with_ellipsis(topic.title.trim(), HOOK_MAX_CHARS);

    let body_source = if topic.summary.trim().is_empty() {
        topic.title.trim()
    } else {
        topic.summary.trim()
    };
    let body = truncate_with_ellipsis(body_source, BODY_MAX_CHARS);

    let cta = format!("Follow for more on {}!", topic.keyword);

    let scenes = vec![
        ScriptScene {
            scene_index: 1,
            kind: SceneKind::Hook,
            image_prompt: format!("bold attention-grabbing title card about {}", topic.title),
            text: hook.clone(),
            duration_seconds: HOOK_SECONDS,
        },
        ScriptScene {
            scene_index: 2,
            kind: SceneKind::Body,
            image_prompt: format!("explaining {} with simple visuals", topic.title),
            text: body,
            duration_seconds: BODY_SECONDS,
        },
        ScriptScene {
            scene_index: 3,
            kind: SceneKind::CallToAction,
            image_prompt: format!("waving goodbye next to a follow button, theme {}", topic.keyword),
            text: cta,
            duration_seconds: CTA_SECONDS,
        },
    ];

    Script::new(topic.id.clone(), topic.title.clone(), hook, character, scenes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ELLIPSIS;

    fn topic(title: &str, summary: &str) -> TrendTopic {
        TrendTopic::manual("rust", title, summary, 50.0)
    }

    #[test]
    fn test_three_scenes_in_order() {
        let script = compose(&topic("Rust 2026", "Everything new."), None);

        let kinds: Vec<SceneKind> = script.scenes.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SceneKind::Hook, SceneKind::Body, SceneKind::CallToAction]);
        let indices: Vec<u32> = script.scenes.iter().map(|s| s.scene_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(script.validate().is_ok());
    }

    #[test]
    fn test_total_duration_matches_scenes() {
        let script = compose(&topic("Rust 2026", "Everything new."), None);
        let sum: u32 = script.scenes.iter().map(|s| s.duration_seconds).sum();
        assert_eq!(script.total_duration_seconds, sum);
        assert_eq!(script.total_duration_seconds, 15);
    }

    #[test]
    fn test_hook_truncated_with_ellipsis() {
        let title = "x".repeat(41);
        let script = compose(&topic(&title, "s"), None);

        assert_eq!(script.hook.chars().count(), HOOK_MAX_CHARS + 1);
        assert!(script.hook.ends_with(ELLIPSIS));
        assert_eq!(script.scenes[0].text, script.hook);

        let exact = "y".repeat(40);
        assert_eq!(compose(&topic(&exact, "s"), None).hook, exact);
    }

    #[test]
    fn test_body_falls_back_to_title() {
        let script = compose(&topic("Only a title", "   "), None);
        assert_eq!(script.scenes[1].text, "Only a title");
    }

    #[test]
    fn test_body_truncated() {
        let script = compose(&topic("t", &"z".repeat(500)), None);
        assert_eq!(script.scenes[1].text.chars().count(), BODY_MAX_CHARS + 1);
        assert!(script.scenes[1].text.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_cta_mentions_keyword() {
        let script = compose(&topic("t", "s"), None);
        assert!(script.scenes[2].text.contains("rust"));
    }

    #[test]
    fn test_character_hint() {
        assert_eq!(compose(&topic("t", "s"), None).character, DEFAULT_CHARACTER);
        assert_eq!(compose(&topic("t", "s"), Some("  ")).character, DEFAULT_CHARACTER);
        assert_eq!(compose(&topic("t", "s"), Some("robot")).character, "robot");
    }

    #[test]
    fn test_prompts_exclude_character() {
        let script = compose(&topic("t", "s"), Some("purple dragon"));
        assert!(script.scenes.iter().all(|s| !s.image_prompt.contains("purple dragon")));
    }

    #[test]
    fn test_links_topic() {
        let t = topic("Rust 2026", "s");
        let script = compose(&t, None);
        assert_eq!(script.topic_id, t.id);
        assert_eq!(script.topic_title, "Rust 2026");
    }
}
