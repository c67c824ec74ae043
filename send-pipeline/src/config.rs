//! Pipeline configuration loaded from environment variables.
//!
//! Every key has a default; unparseable values are logged and replaced by the default so a
//! typo in `.env` never prevents startup.

use companion_core::Language;
use context::SelectionConfig;
use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_CHAT_MODE: &str = "default";
pub const DEFAULT_USER_ID: &str = "anonymous";
pub const DEFAULT_LOG_FILE: &str = "logs/companion.log";

/// Configuration for [`crate::SendCoordinator`] and the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub selection: SelectionConfig,
    /// Language assumed when classification has no signal.
    pub default_language: Language,
    pub chat_mode: String,
    pub user_id: String,
    pub log_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            default_language: Language::English,
            chat_mode: DEFAULT_CHAT_MODE.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Log file path from `LOG_FILE`. Reads no other key and never logs, so it is safe to call
    /// before tracing is installed.
    pub fn log_file_from_env() -> String {
        env_non_empty("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
    }

    /// Load from environment variables, falling back to defaults per key. Fallbacks are
    /// reported with `warn!`, so install tracing first.
    pub fn from_env() -> Self {
        let defaults = SelectionConfig::default();
        let selection = SelectionConfig {
            max_tokens: env_parse("CONTEXT_MAX_TOKENS", defaults.max_tokens),
            prioritize_safety: env_bool("CONTEXT_PRIORITIZE_SAFETY", defaults.prioritize_safety),
            preserve_continuity: env_bool(
                "CONTEXT_PRESERVE_CONTINUITY",
                defaults.preserve_continuity,
            ),
            include_system_messages: env_bool(
                "CONTEXT_INCLUDE_SYSTEM",
                defaults.include_system_messages,
            ),
            exclude_system_hard: env_bool(
                "CONTEXT_EXCLUDE_SYSTEM_HARD",
                defaults.exclude_system_hard,
            ),
            preferred_language: env_non_empty("CONTEXT_PREFERRED_LANGUAGE").and_then(|raw| {
                raw.parse::<Language>()
                    .map_err(|e| warn!(error = %e, "Ignoring CONTEXT_PREFERRED_LANGUAGE"))
                    .ok()
            }),
            topic_overlap_threshold: env_parse(
                "CONTEXT_TOPIC_OVERLAP_THRESHOLD",
                defaults.topic_overlap_threshold,
            ),
            topic_window: env_parse("CONTEXT_TOPIC_WINDOW", defaults.topic_window),
        };

        Self {
            selection,
            default_language: env_parse("DEFAULT_LANGUAGE", Language::English),
            chat_mode: env_non_empty("CHAT_MODE").unwrap_or_else(|| DEFAULT_CHAT_MODE.to_string()),
            user_id: env_non_empty("USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            log_file: Self::log_file_from_env(),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env_non_empty(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
        None => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env_non_empty(key) {
        Some(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!(key, value = %raw, "Invalid boolean, using default");
                default
            }
        },
        None => default,
    }
}
