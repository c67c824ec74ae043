//! Scored messages and the context bundle produced by the selector.

use classifier::Classification;
use companion_core::{Language, Message, Topic};
use serde::Serialize;

/// A message enriched with derived language, topics, safety flag, relevance and cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMessage {
    pub message: Message,
    /// Position in the selector's input.
    pub index: usize,
    pub language: Language,
    pub topics: Vec<Topic>,
    pub safety_flag: bool,
    pub relevance_score: f64,
    pub estimated_tokens: usize,
}

impl ScoredMessage {
    pub(crate) fn new(
        message: &Message,
        index: usize,
        classification: Classification,
        relevance_score: f64,
        estimated_tokens: usize,
    ) -> Self {
        Self {
            message: message.clone(),
            index,
            language: classification.language,
            topics: classification.topics,
            safety_flag: classification.safety_flag,
            relevance_score,
            estimated_tokens,
        }
    }
}

/// Messages selected for one send, in original chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBundle {
    pub entries: Vec<ScoredMessage>,
    /// Sum of `estimated_tokens` over `entries`.
    pub estimated_tokens: usize,
    /// Some candidate was left out.
    pub truncated: bool,
    /// The safety floor or continuity tail pushed cost above the budget.
    pub over_budget: bool,
    /// Number of entries included through the safety floor.
    pub safety_count: usize,
    /// Number of messages considered after hard filtering.
    pub candidate_count: usize,
}

impl ContextBundle {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(|e| &e.message)
    }

    pub fn message_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.message.id == id)
    }
}
