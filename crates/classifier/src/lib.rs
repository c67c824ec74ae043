//! # Classifier
//!
//! Heuristic language and topic classification for conversation messages.
//!
//! - **Language**: any secondary-script character decides immediately; otherwise curated
//!   per-language keyword hits are compared; ties and no evidence fall back to a caller default.
//! - **Topics**: case-insensitive substring match against a fixed bilingual taxonomy
//!   (safety risk, affect, relationships, work, health). Zero or more topics per text.
//! - **Safety**: a text is safety-relevant when it matches the safety-risk topic.
//!
//! Classification is pure and never fails; malformed or empty input degrades to the default
//! language and an empty topic set.

mod language;
mod script;
mod taxonomy;


pub use language::detect_language;
pub use script::{contains_secondary_script, is_secondary_script_char};
pub use taxonomy::{default_taxonomy, TopicRule};

use companion_core::{Language, Message, Topic};
use serde::Serialize;
use tracing::debug;

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub language: Language,
    /// Matched topics in taxonomy order, without duplicates.
    pub topics: Vec<Topic>,
    /// True when the safety-risk topic matched.
    pub safety_flag: bool,
}

impl Classification {
    pub fn has_topic(&self, topic: Topic) -> bool {
        self.topics.contains(&topic)
    }
}

/// Language/topic classifier with a configurable default language and taxonomy.
#[derive(Debug, Clone)]
pub struct Classifier {
    default_language: Language,
    taxonomy: Vec<TopicRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Language::English)
    }
}

impl Classifier {
    /// Creates a classifier with the built-in taxonomy.
    pub fn new(default_language: Language) -> Self {
        Self {
            default_language,
            taxonomy: default_taxonomy(),
        }
    }

    /// Replaces the taxonomy.
    pub fn with_taxonomy(mut self, taxonomy: Vec<TopicRule>) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Classifies raw text.
    pub fn classify(&self, text: &str) -> Classification {
        if text.trim().is_empty() {
            return Classification {
                language: self.default_language,
                topics: Vec::new(),
                safety_flag: false,
            };
        }

        let language = detect_language(text, self.default_language);
        let topics = self.topics(text);
        let safety_flag = topics.contains(&Topic::SafetyRisk);
        debug!(
            language = %language,
            topics = ?topics,
            safety_flag,
            text_len = text.len(),
            "Text classified"
        );
        Classification {
            language,
            topics,
            safety_flag,
        }
    }

    /// Classifies a message, preferring annotations it already carries over derived values.
    ///
    /// An explicit `safety_flag` on the message wins over topic-based detection in both directions.
    pub fn classify_message(&self, message: &Message) -> Classification {
        let derived = self.classify(&message.text);
        let topics = match &message.topics {
            Some(topics) => normalize_topics(topics),
            None => derived.topics,
        };
        let safety_flag = message
            .safety_flag
            .unwrap_or_else(|| topics.contains(&Topic::SafetyRisk));
        Classification {
            language: message.language.unwrap_or(derived.language),
            topics,
            safety_flag,
        }
    }

    /// Union of topics across `texts`, in taxonomy order.
    pub fn topics_of<'a, I>(&self, texts: I) -> Vec<Topic>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut all: Vec<Topic> = texts.into_iter().flat_map(|t| self.topics(t)).collect();
        all.sort();
        all.dedup();
        all
    }

    fn topics(&self, text: &str) -> Vec<Topic> {
        let lowered = text.to_lowercase();
        let matched: Vec<Topic> = self
            .taxonomy
            .iter()
            .filter(|rule| rule.matches(&lowered))
            .map(|rule| rule.topic)
            .collect();
        normalize_topics(&matched)
    }
}

fn normalize_topics(topics: &[Topic]) -> Vec<Topic> {
    let mut topics = topics.to_vec();
    topics.sort();
    topics.dedup();
    topics
}
