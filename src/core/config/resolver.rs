//! Turns backend setting rows into a fully-populated [`ChatToolConfig`].
//!
//! Each row carries a deployment override (`value`) and the server-declared
//! default (`default_value`). The override wins when present; a value that
//! does not coerce to the field's type counts as absent, and absent fields
//! fall back to the built-ins in [`super::defaults`].

use super::defaults::{
    DEFAULT_TOOLS_ENABLED, DEFAULT_TOOLS_MAX_STEPS, DEFAULT_TOOLS_SYSTEM_PROMPT,
    KEY_TOOLS_ENABLED, KEY_TOOLS_MAX_STEPS, KEY_TOOLS_SYSTEM_PROMPT,
};
use serde::{Deserialize, Serialize};

/// One row of the backend settings listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl ConfigEntry {
    pub fn new(key: &str, value: Option<&str>, default_value: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            value: value.map(str::to_string),
            default_value: default_value.map(str::to_string),
        }
    }

    fn effective(&self) -> Option<&str> {
        self.value.as_deref().or(self.default_value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatToolConfig {
    pub enabled: bool,
    pub max_steps: u32,
    pub system_prompt: String,
}

impl Default for ChatToolConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_TOOLS_ENABLED,
            max_steps: DEFAULT_TOOLS_MAX_STEPS,
            system_prompt: DEFAULT_TOOLS_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Resolve chat-tool settings. Pure; unknown keys are ignored and the first
/// row for a key wins.
pub fn resolve(entries: &[ConfigEntry]) -> ChatToolConfig {
    let fallback = ChatToolConfig::default();
    ChatToolConfig {
        enabled: raw_value(entries, KEY_TOOLS_ENABLED)
            .and_then(parse_bool)
            .unwrap_or(fallback.enabled),
        max_steps: raw_value(entries, KEY_TOOLS_MAX_STEPS)
            .and_then(parse_steps)
            .unwrap_or(fallback.max_steps),
        system_prompt: raw_value(entries, KEY_TOOLS_SYSTEM_PROMPT)
            .map(str::to_string)
            .unwrap_or(fallback.system_prompt),
    }
}

fn raw_value<'a>(entries: &'a [ConfigEntry], key: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|entry| entry.key == key)
        .and_then(ConfigEntry::effective)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_steps(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_server_defaults() {
        let config = resolve(&[
            ConfigEntry::new(KEY_TOOLS_ENABLED, Some("false"), Some("true")),
            ConfigEntry::new(KEY_TOOLS_MAX_STEPS, Some("5"), Some("10")),
        ]);

        assert!(!config.enabled);
        assert_eq!(config.max_steps, 5);
        assert!(config.system_prompt.contains("discover_tools"));
        assert!(config.system_prompt.contains("execute_tool"));
    }

    #[test]
    fn missing_keys_fall_back_to_builtins() {
        let config = resolve(&[ConfigEntry::new("ui.theme", Some("dark"), None)]);
        assert_eq!(config, ChatToolConfig::default());
        assert!(config.enabled);
        assert_eq!(config.max_steps, 10);

        assert_eq!(resolve(&[]), ChatToolConfig::default());
    }

    #[test]
    fn server_default_applies_when_override_is_null() {
        let config = resolve(&[
            ConfigEntry::new(KEY_TOOLS_ENABLED, None, Some("false")),
            ConfigEntry::new(KEY_TOOLS_MAX_STEPS, None, Some("3")),
            ConfigEntry::new(KEY_TOOLS_SYSTEM_PROMPT, None, Some("Use tools sparingly.")),
        ]);

        assert!(!config.enabled);
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.system_prompt, "Use tools sparingly.");
    }

    #[test]
    fn uncoercible_values_count_as_absent() {
        let config = resolve(&[
            ConfigEntry::new(KEY_TOOLS_ENABLED, Some("FALSE"), Some("false")),
            ConfigEntry::new(KEY_TOOLS_MAX_STEPS, Some("ten"), Some("4")),
        ]);

        // The override is present, so the server default is not consulted.
        assert!(config.enabled);
        assert_eq!(config.max_steps, 10);

        for raw in ["-1", "2.5", " 7", ""] {
            let config = resolve(&[ConfigEntry::new(KEY_TOOLS_MAX_STEPS, Some(raw), None)]);
            assert_eq!(config.max_steps, 10, "{raw:?} should not parse");
        }
    }

    #[test]
    fn first_row_for_a_key_wins() {
        let config = resolve(&[
            ConfigEntry::new(KEY_TOOLS_MAX_STEPS, Some("2"), None),
            ConfigEntry::new(KEY_TOOLS_MAX_STEPS, Some("8"), None),
        ]);
        assert_eq!(config.max_steps, 2);
    }

    #[test]
    fn system_prompt_is_used_verbatim() {
        let config = resolve(&[ConfigEntry::new(
            KEY_TOOLS_SYSTEM_PROMPT,
            Some("  keep\nwhitespace  "),
            None,
        )]);
        assert_eq!(config.system_prompt, "  keep\nwhitespace  ");
    }

    #[test]
    fn entries_deserialize_from_backend_rows() {
        let entries: Vec<ConfigEntry> = serde_json::from_value(serde_json::json!([
            {"key": "agent.tools.enabled", "value": null, "default_value": "true"},
            {"key": "agent.tools.maxSteps", "value": "6"}
        ]))
        .expect("rows should deserialize");

        assert_eq!(entries[0].value, None);
        assert_eq!(entries[1].default_value, None);
        assert_eq!(resolve(&entries).max_steps, 6);
    }
}
