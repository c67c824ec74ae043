//! Relevance scoring.
//!
//! The score is a purely additive sum of independent terms, clamped at zero. Each term is a
//! public function of its own inputs so it can be tested alone; [`RelevanceScorer::breakdown`]
//! exposes all of them for one message.

use chrono::{DateTime, Utc};
use classifier::Classification;
use companion_core::{Language, Message, MessageRole, Sentiment, Topic};
use serde::Serialize;

use crate::config::{ScoringWeights, SelectionConfig};

/// Every additive term of one message's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base: f64,
    pub recency: f64,
    pub safety: f64,
    pub role: f64,
    pub language: f64,
    pub topic_overlap: f64,
    pub sentiment: f64,
    pub length: f64,
}

impl ScoreBreakdown {
    /// Sum of all terms, clamped to be non-negative.
    pub fn total(&self) -> f64 {
        let sum = self.base
            + self.recency
            + self.safety
            + self.role
            + self.language
            + self.topic_overlap
            + self.sentiment
            + self.length;
        sum.max(0.0)
    }
}

/// Scores messages against a [`SelectionConfig`] and the conversation's current topics.
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score of `message` given its classification. Always `>= 0`.
    pub fn score(
        &self,
        message: &Message,
        classification: &Classification,
        config: &SelectionConfig,
        current_topics: &[Topic],
        now: DateTime<Utc>,
    ) -> f64 {
        self.breakdown(message, classification, config, current_topics, now)
            .total()
    }

    pub fn breakdown(
        &self,
        message: &Message,
        classification: &Classification,
        config: &SelectionConfig,
        current_topics: &[Topic],
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        let w = &self.weights;
        let age_hours = (now - message.timestamp).num_milliseconds() as f64 / 3_600_000.0;
        ScoreBreakdown {
            base: w.base,
            recency: recency_term(w, age_hours),
            safety: safety_term(w, classification.safety_flag, config.prioritize_safety),
            role: role_term(w, message.role, config.include_system_messages),
            language: language_term(w, classification.language, config.preferred_language),
            topic_overlap: topic_overlap_term(
                w,
                &classification.topics,
                current_topics,
                config.topic_overlap_threshold,
            ),
            sentiment: sentiment_term(w, message.sentiment, config.prioritize_safety),
            length: length_term(w, message.text.chars().count()),
        }
    }
}

/// `max(0, recency_max - age_hours / hours_per_point)`. Future timestamps count as age zero.
pub fn recency_term(w: &ScoringWeights, age_hours: f64) -> f64 {
    (w.recency_max - age_hours.max(0.0) / w.recency_hours_per_point).max(0.0)
}

pub fn safety_term(w: &ScoringWeights, flagged: bool, prioritize_safety: bool) -> f64 {
    if flagged && prioritize_safety {
        w.safety_bonus
    } else {
        0.0
    }
}

pub fn role_term(w: &ScoringWeights, role: MessageRole, include_system: bool) -> f64 {
    match role {
        MessageRole::System if include_system => w.system_included,
        MessageRole::System => w.system_excluded,
        MessageRole::Assistant => w.assistant,
        MessageRole::User => w.user,
    }
}

/// Skipped (zero) when no preferred language is configured.
pub fn language_term(w: &ScoringWeights, language: Language, preferred: Option<Language>) -> f64 {
    match preferred {
        None => 0.0,
        Some(p) if p == language => w.language_match,
        Some(_) => w.language_mismatch,
    }
}

/// Fraction of `current` topics that `topics` also carries; 0 when `current` is empty.
pub fn overlap_fraction(topics: &[Topic], current: &[Topic]) -> f64 {
    if current.is_empty() {
        return 0.0;
    }
    let shared = current.iter().filter(|t| topics.contains(t)).count();
    shared as f64 / current.len() as f64
}

pub fn topic_overlap_term(
    w: &ScoringWeights,
    topics: &[Topic],
    current: &[Topic],
    threshold: f64,
) -> f64 {
    let fraction = overlap_fraction(topics, current);
    if fraction > 0.0 && fraction >= threshold {
        w.topic_overlap * fraction
    } else {
        0.0
    }
}

pub fn sentiment_term(
    w: &ScoringWeights,
    sentiment: Option<Sentiment>,
    prioritize_safety: bool,
) -> f64 {
    match sentiment {
        Some(Sentiment::Safety) | Some(Sentiment::Negative) if prioritize_safety => {
            w.negative_sentiment_prioritized
        }
        Some(Sentiment::Safety) | Some(Sentiment::Negative) => w.negative_sentiment,
        Some(Sentiment::Positive) => w.positive_sentiment,
        Some(Sentiment::Neutral) => w.neutral_sentiment,
        None => 0.0,
    }
}

pub fn length_term(w: &ScoringWeights, chars: usize) -> f64 {
    if chars < w.short_text_chars {
        w.short_text
    } else if chars > w.long_text_chars {
        w.long_text
    } else {
        0.0
    }
}
