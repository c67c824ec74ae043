//! Selection configuration and scoring weights.
//!
//! Every scoring constant is a named field so the heuristics can be tuned and tested
//! independently of the scorer.

use companion_core::Language;
use serde::{Deserialize, Serialize};

/// Options controlling which messages the selector forwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionConfig {
    /// Budget in estimated tokens. The safety floor and continuity tail may exceed it.
    pub max_tokens: usize,
    /// Safety-flagged messages are always included and scored higher.
    pub prioritize_safety: bool,
    /// Messages after the newest selected one are appended even if over budget.
    pub preserve_continuity: bool,
    /// System messages get a bonus instead of a penalty.
    pub include_system_messages: bool,
    /// When system messages are not included, drop them before packing instead of penalising.
    pub exclude_system_hard: bool,
    pub preferred_language: Option<Language>,
    /// Minimum overlap fraction before the topic bonus applies.
    pub topic_overlap_threshold: f64,
    /// How many trailing messages define the current topics.
    pub topic_window: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            prioritize_safety: true,
            preserve_continuity: true,
            include_system_messages: false,
            exclude_system_hard: false,
            preferred_language: None,
            topic_overlap_threshold: 0.3,
            topic_window: 3,
        }
    }
}

impl SelectionConfig {
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_prioritize_safety(mut self, enabled: bool) -> Self {
        self.prioritize_safety = enabled;
        self
    }

    pub fn with_preserve_continuity(mut self, enabled: bool) -> Self {
        self.preserve_continuity = enabled;
        self
    }

    pub fn with_include_system_messages(mut self, enabled: bool) -> Self {
        self.include_system_messages = enabled;
        self
    }

    pub fn with_exclude_system_hard(mut self, enabled: bool) -> Self {
        self.exclude_system_hard = enabled;
        self
    }

    pub fn with_preferred_language(mut self, language: Option<Language>) -> Self {
        self.preferred_language = language;
        self
    }

    pub fn with_topic_overlap_threshold(mut self, threshold: f64) -> Self {
        self.topic_overlap_threshold = threshold;
        self
    }

    /// True when system messages are removed before scoring.
    pub fn filters_system_messages(&self) -> bool {
        self.exclude_system_hard && !self.include_system_messages
    }
}

/// Additive scoring constants. Defaults are the hand-tuned production values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub base: f64,
    /// Recency bonus for a message of age zero.
    pub recency_max: f64,
    /// Hours of age that cost one point of recency bonus.
    pub recency_hours_per_point: f64,
    pub safety_bonus: f64,
    pub system_included: f64,
    pub system_excluded: f64,
    pub assistant: f64,
    pub user: f64,
    pub language_match: f64,
    pub language_mismatch: f64,
    /// Multiplied by the overlap fraction.
    pub topic_overlap: f64,
    pub negative_sentiment_prioritized: f64,
    pub negative_sentiment: f64,
    pub positive_sentiment: f64,
    pub neutral_sentiment: f64,
    /// Messages shorter than this many characters get `short_text`.
    pub short_text_chars: usize,
    pub short_text: f64,
    /// Messages longer than this many characters get `long_text`.
    pub long_text_chars: usize,
    pub long_text: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            recency_max: 2.0,
            recency_hours_per_point: 24.0,
            safety_bonus: 10.0,
            system_included: 3.0,
            system_excluded: -5.0,
            assistant: 0.5,
            user: 0.0,
            language_match: 1.0,
            language_mismatch: -0.5,
            topic_overlap: 2.0,
            negative_sentiment_prioritized: 2.0,
            negative_sentiment: 0.5,
            positive_sentiment: 0.5,
            neutral_sentiment: 0.1,
            short_text_chars: 10,
            short_text: -0.5,
            long_text_chars: 500,
            long_text: 0.5,
        }
    }
}
