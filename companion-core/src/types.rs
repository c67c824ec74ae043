//! Core types: message, role, sentiment, language and topic tags.
//!
//! Messages are immutable once they enter the subsystem; derived data (language, topics,
//! relevance) is computed alongside them rather than written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownLanguage;

/// Author of a message in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    /// Wire name used by the generation service (`user`, `assistant`, `system`).
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

/// Sentiment label attached to a message by upstream analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Crisis-level content; treated like negative but never below it.
    Safety,
    Negative,
    Positive,
    Neutral,
}

/// Language tag. `English` is the primary language, `Chinese` the secondary script.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    /// Short tag sent over the wire (`en`, `zh`).
    pub fn as_tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Ok(Language::English),
            "zh" | "zh-cn" | "zh-tw" | "zh-hans" | "zh-hant" | "chinese" => Ok(Language::Chinese),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Topic taxonomy used for relevance scoring and safety detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    SafetyRisk,
    Affect,
    Relationships,
    Work,
    Health,
}

impl Topic {
    /// Every topic in taxonomy order.
    pub const ALL: [Topic; 5] = [
        Topic::SafetyRisk,
        Topic::Affect,
        Topic::Relationships,
        Topic::Work,
        Topic::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::SafetyRisk => "safety_risk",
            Topic::Affect => "affect",
            Topic::Relationships => "relationships",
            Topic::Work => "work",
            Topic::Health => "health",
        }
    }
}

/// A single conversation message.
///
/// `id` is opaque and unique within a conversation. `timestamp` approximates ordering across
/// sources; ties are broken by arrival sequence, never by content. The optional fields are
/// upstream annotations and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Message {
    /// Creates a message without annotations.
    pub fn new(
        id: impl Into<String>,
        role: MessageRole,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            timestamp,
            safety_flag: None,
            sentiment: None,
            topics: None,
            language: None,
        }
    }

    pub fn user(id: impl Into<String>, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(id, MessageRole::User, text, timestamp)
    }

    pub fn assistant(
        id: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(id, MessageRole::Assistant, text, timestamp)
    }

    pub fn system(id: impl Into<String>, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(id, MessageRole::System, text, timestamp)
    }

    pub fn with_safety_flag(mut self, flagged: bool) -> Self {
        self.safety_flag = Some(flagged);
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    pub fn with_topics(mut self, topics: Vec<Topic>) -> Self {
        self.topics = Some(topics);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// True when upstream explicitly flagged this message as safety-relevant.
    pub fn is_flagged(&self) -> bool {
        self.safety_flag.unwrap_or(false)
    }
}
