//! Notification categories, compiled-in defaults, and the environment
//! override resolver.
//!
//! Every tunable resolves the same way: a `TASK_NOTIFY_<CATEGORY>_<SETTING>`
//! environment variable wins, otherwise a compiled-in per-category default
//! applies. Nothing is cached; every lookup reads the live process
//! environment, so the settings resource always reflects the current state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Prefix shared by all configuration environment variables,
/// e.g. `TASK_NOTIFY_START_SOUND`.
pub const ENV_PREFIX: &str = "TASK_NOTIFY";

/// The 14 alert sounds shipped in `/System/Library/Sounds` on macOS.
pub const SYSTEM_SOUNDS: [&str; 14] = [
    "Basso",
    "Blow",
    "Bottle",
    "Frog",
    "Funk",
    "Glass",
    "Hero",
    "Morse",
    "Ping",
    "Pop",
    "Purr",
    "Sosumi",
    "Submarine",
    "Tink",
];

// ---------------------------------------------------------------------------
// Categories and settings
// ---------------------------------------------------------------------------

/// Notification category. The set is closed; anything else a caller sends
/// is coerced to [`NotificationKind::Complete`] by the dispatcher.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Start,
    Complete,
    Error,
}

impl NotificationKind {
    /// All categories, in declaration order.
    pub const ALL: [NotificationKind; 3] = [Self::Start, Self::Complete, Self::Error];

    /// Parse a status string, case-insensitively. Returns `None` for
    /// anything outside the closed set; the caller decides what to do with
    /// that (the dispatcher falls back to `Complete`).
    pub fn parse(status: &str) -> Option<Self> {
        match status.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "complete" => Some(Self::Complete),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Lowercase wire name: `start`, `complete` or `error`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-category setting name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Title,
    Message,
    Sound,
}

impl ConfigKey {
    /// All settings, in declaration order.
    pub const ALL: [ConfigKey; 3] = [Self::Title, Self::Message, Self::Sound];

    /// Recognize a setting name, case-insensitively. `None` means the name
    /// itself is unknown, not that the value is unconfigured.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "message" => Some(Self::Message),
            "sound" => Some(Self::Sound),
            _ => None,
        }
    }

    /// Lowercase name as used in environment variable suffixes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Message => "message",
            Self::Sound => "sound",
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Compiled-in default for a (category, setting) pair. Total over both
/// enums, so a default always exists.
pub fn default_for(kind: NotificationKind, key: ConfigKey) -> &'static str {
    use ConfigKey::*;
    use NotificationKind::*;
    match (kind, key) {
        (Start, Title) => "Processing started",
        (Complete, Title) => "Processing finished",
        (Error, Title) => "Processing error",
        (Start, Message) => "Processing has started",
        (Complete, Message) => "Processing is complete",
        (Error, Message) => "An error occurred during processing",
        (Start, Sound) => "Glass",
        (Complete, Sound) => "Hero",
        (Error, Sound) => "Basso",
    }
}

/// Environment variable name for a (category, setting) pair,
/// e.g. `TASK_NOTIFY_ERROR_SOUND`.
pub fn env_key(kind: NotificationKind, key: ConfigKey) -> String {
    format!(
        "{}_{}_{}",
        ENV_PREFIX,
        kind.as_str().to_ascii_uppercase(),
        key.as_str().to_ascii_uppercase()
    )
}

/// Effective value for a (category, setting) pair: the environment override
/// when present (taken verbatim, sound names are not validated), otherwise
/// the compiled-in default.
pub fn resolve(kind: NotificationKind, key: ConfigKey) -> String {
    std::env::var(env_key(kind, key)).unwrap_or_else(|_| default_for(kind, key).to_string())
}

/// String-keyed variant of [`resolve`]. Returns `None` only when `setting`
/// does not name a known setting.
pub fn resolve_setting(kind: NotificationKind, setting: &str) -> Option<String> {
    ConfigKey::parse(setting).map(|key| resolve(kind, key))
}

// ---------------------------------------------------------------------------
// Snapshot (served by the settings resource)
// ---------------------------------------------------------------------------

/// Resolved settings for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySettings {
    pub title: String,
    pub message: String,
    pub sound: String,
}

/// Point-in-time view of the full notification configuration, keyed by
/// category plus the list of available system sounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(flatten)]
    pub categories: BTreeMap<NotificationKind, CategorySettings>,
    pub available_sounds: Vec<String>,
}

/// Build a fresh snapshot from the current environment. Never cached, so
/// overrides set after startup show up on the next call.
pub fn snapshot() -> SettingsSnapshot {
    let categories = NotificationKind::ALL
        .into_iter()
        .map(|kind| {
            (
                kind,
                CategorySettings {
                    title: resolve(kind, ConfigKey::Title),
                    message: resolve(kind, ConfigKey::Message),
                    sound: resolve(kind, ConfigKey::Sound),
                },
            )
        })
        .collect();

    SettingsSnapshot {
        categories,
        available_sounds: SYSTEM_SOUNDS.iter().map(|s| s.to_string()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::test_support::{clear_overrides, env_guard};
    use super::*;

    #[test]
    fn test_parse_kind_case_insensitive() {
        assert_eq!(NotificationKind::parse("start"), Some(NotificationKind::Start));
        assert_eq!(NotificationKind::parse("START"), Some(NotificationKind::Start));
        assert_eq!(NotificationKind::parse("CoMpLeTe"), Some(NotificationKind::Complete));
        assert_eq!(NotificationKind::parse("Error"), Some(NotificationKind::Error));
    }

    #[test]
    fn test_parse_kind_rejects_unknown() {
        assert_eq!(NotificationKind::parse("success"), None);
        assert_eq!(NotificationKind::parse("started"), None);
        assert_eq!(NotificationKind::parse(""), None);
    }

    #[test]
    fn test_parse_config_key() {
        assert_eq!(ConfigKey::parse("title"), Some(ConfigKey::Title));
        assert_eq!(ConfigKey::parse("Sound"), Some(ConfigKey::Sound));
        assert_eq!(ConfigKey::parse("MESSAGE"), Some(ConfigKey::Message));
        assert_eq!(ConfigKey::parse("volume"), None);
    }

    #[test]
    fn test_env_key_format() {
        assert_eq!(
            env_key(NotificationKind::Error, ConfigKey::Sound),
            "TASK_NOTIFY_ERROR_SOUND"
        );
        assert_eq!(
            env_key(NotificationKind::Start, ConfigKey::Title),
            "TASK_NOTIFY_START_TITLE"
        );
    }

    #[test]
    fn test_default_table() {
        assert_eq!(default_for(NotificationKind::Complete, ConfigKey::Title), "Processing finished");
        assert_eq!(default_for(NotificationKind::Start, ConfigKey::Sound), "Glass");
        assert_eq!(default_for(NotificationKind::Complete, ConfigKey::Sound), "Hero");
        assert_eq!(default_for(NotificationKind::Error, ConfigKey::Sound), "Basso");
        assert_eq!(
            default_for(NotificationKind::Error, ConfigKey::Message),
            "An error occurred during processing"
        );
    }

    #[test]
    fn test_resolve_prefers_env_override() {
        let _env = env_guard();
        std::env::set_var("TASK_NOTIFY_START_TITLE", "Batch ready");
        assert_eq!(resolve(NotificationKind::Start, ConfigKey::Title), "Batch ready");
        std::env::remove_var("TASK_NOTIFY_START_TITLE");
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let _env = env_guard();
        std::env::remove_var("TASK_NOTIFY_COMPLETE_MESSAGE");
        assert_eq!(
            resolve(NotificationKind::Complete, ConfigKey::Message),
            "Processing is complete"
        );
    }

    #[test]
    fn test_resolve_takes_override_verbatim() {
        let _env = env_guard();
        // Sound overrides are not validated or normalized here.
        std::env::set_var("TASK_NOTIFY_ERROR_SOUND", "Basso.aiff");
        assert_eq!(resolve(NotificationKind::Error, ConfigKey::Sound), "Basso.aiff");
        std::env::remove_var("TASK_NOTIFY_ERROR_SOUND");
    }

    #[test]
    fn test_resolve_setting_unknown_name() {
        let _env = env_guard();
        assert_eq!(resolve_setting(NotificationKind::Start, "volume"), None);
        assert!(resolve_setting(NotificationKind::Start, "SOUND").is_some());
    }

    #[test]
    fn test_resolve_every_pair_override_and_default() {
        let _env = env_guard();
        clear_overrides();
        for kind in NotificationKind::ALL {
            for key in ConfigKey::ALL {
                assert_eq!(resolve(kind, key), default_for(kind, key));

                let var = env_key(kind, key);
                std::env::set_var(&var, "overridden");
                assert_eq!(resolve(kind, key), "overridden");
                std::env::remove_var(&var);
            }
        }
    }

    #[test]
    fn test_snapshot_covers_all_categories() {
        let _env = env_guard();
        clear_overrides();
        let snap = snapshot();
        assert_eq!(snap.categories.len(), 3);
        assert_eq!(snap.available_sounds.len(), SYSTEM_SOUNDS.len());
        let error = &snap.categories[&NotificationKind::Error];
        assert_eq!(error.title, "Processing error");
        assert_eq!(error.sound, "Basso");

        // Idempotent while the environment holds still.
        assert_eq!(snap, snapshot());
    }

    #[test]
    fn test_snapshot_reflects_environment() {
        let _env = env_guard();
        clear_overrides();
        std::env::set_var("TASK_NOTIFY_COMPLETE_SOUND", "Submarine");
        let snap = snapshot();
        assert_eq!(snap.categories[&NotificationKind::Complete].sound, "Submarine");
        std::env::remove_var("TASK_NOTIFY_COMPLETE_SOUND");

        // Recomputed on every call, so the override is gone again.
        let snap = snapshot();
        assert_eq!(snap.categories[&NotificationKind::Complete].sound, "Hero");
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let _env = env_guard();
        clear_overrides();
        let value = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(value["start"]["sound"], "Glass");
        assert_eq!(value["complete"]["title"], "Processing finished");
        assert_eq!(value["error"]["message"], "An error occurred during processing");
        assert_eq!(value["available_sounds"].as_array().unwrap().len(), 14);
    }
}
