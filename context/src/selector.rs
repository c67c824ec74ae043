//! Context selector: packs scored messages into a token budget with a safety floor.
//!
//! Steps, in order:
//! 1. Current topics from the last `topic_window` messages.
//! 2. Enrich every candidate with language, topics, safety flag, score and cost.
//! 3. Safety-flagged messages (when prioritised) are taken unconditionally and counted first.
//! 4. The rest are ranked by score, descending; ties keep input order.
//! 5. Greedy fill: a message that would overflow the budget is skipped, never cut.
//! 6. Continuity: everything after the newest budget-packed message is appended regardless of
//!    cost. Safety-floor entries never anchor the tail.
//! 7. Output is restored to input order.

use chrono::{DateTime, Utc};
use classifier::Classifier;
use companion_core::{Message, MessageRole, Topic};
use tracing::{debug, info, instrument};

use crate::config::{ScoringWeights, SelectionConfig};
use crate::estimator::TokenEstimator;
use crate::scorer::RelevanceScorer;
use crate::types::{ContextBundle, ScoredMessage};

/// Builds [`ContextBundle`]s from conversation history.
#[derive(Debug, Clone, Default)]
pub struct ContextSelector {
    classifier: Classifier,
    scorer: RelevanceScorer,
    estimator: TokenEstimator,
}

impl ContextSelector {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            scorer: RelevanceScorer::default(),
            estimator: TokenEstimator::default(),
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.scorer = RelevanceScorer::new(weights);
        self
    }

    pub fn with_estimator(mut self, estimator: TokenEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn estimator(&self) -> &TokenEstimator {
        &self.estimator
    }

    /// Selects messages using the current time for recency.
    pub fn optimize(&self, messages: &[Message], config: &SelectionConfig) -> ContextBundle {
        self.optimize_at(messages, config, Utc::now())
    }

    /// Selects messages with recency measured against `now`.
    ///
    /// # Algorithm
    ///
    /// 1. Scores and prices every candidate (see [`ContextSelector::score_all`])
    /// 2. With `prioritize_safety`, takes every safety-flagged candidate and charges its cost,
    ///    even when that alone exceeds `max_tokens`
    /// 3. Ranks the remaining candidates by relevance, descending; ties keep input order
    /// 4. Packs greedily: a candidate that would overflow the budget is skipped and the next
    ///    one is tried
    /// 5. With `preserve_continuity`, appends every candidate after the newest one packed in
    ///    step 4, regardless of cost
    /// 6. Returns the chosen entries in input order
    ///
    /// # Special Cases
    ///
    /// - Empty input returns an empty bundle
    /// - A safety floor that already exceeds the budget packs nothing else and pulls no tail,
    ///   so the bundle holds only the flagged messages
    /// - `over_budget` is set whenever the floor or the continuity tail pushed the total past
    ///   `max_tokens`
    ///
    /// # External Interactions
    ///
    /// None. Selection is pure; one `info!` summary is logged per call.
    #[instrument(
        skip(self, messages, config),
        fields(message_count = messages.len(), max_tokens = config.max_tokens)
    )]
    pub fn optimize_at(
        &self,
        messages: &[Message],
        config: &SelectionConfig,
        now: DateTime<Utc>,
    ) -> ContextBundle {
        if messages.is_empty() {
            debug!("No messages to select from");
            return ContextBundle::default();
        }

        let candidates = self.score_all(messages, config, now);
        let n = candidates.len();
        let mut selected = vec![false; n];
        let mut used = 0usize;
        let mut safety_count = 0usize;

        if config.prioritize_safety {
            for (k, c) in candidates.iter().enumerate() {
                if c.safety_flag {
                    selected[k] = true;
                    used += c.estimated_tokens;
                    safety_count += 1;
                }
            }
            debug!(safety_count, used, "Safety floor applied");
        }

        let mut newest_packed: Option<usize> = None;
        let mut ranked: Vec<usize> = (0..n).filter(|k| !selected[*k]).collect();
        ranked.sort_by(|a, b| {
            candidates[*b]
                .relevance_score
                .total_cmp(&candidates[*a].relevance_score)
        });

        for k in ranked {
            let cost = candidates[k].estimated_tokens;
            if used + cost <= config.max_tokens {
                selected[k] = true;
                used += cost;
                newest_packed = newest_packed.max(Some(k));
            } else {
                debug!(
                    message_id = %candidates[k].message.id,
                    cost,
                    used,
                    "Skipping message over budget"
                );
            }
        }

        if config.preserve_continuity {
            if let Some(newest) = newest_packed {
                for k in newest + 1..n {
                    if !selected[k] {
                        selected[k] = true;
                        used += candidates[k].estimated_tokens;
                    }
                }
            }
        }

        let selected_count = selected.iter().filter(|s| **s).count();
        let entries: Vec<ScoredMessage> = candidates
            .into_iter()
            .zip(selected)
            .filter_map(|(c, keep)| keep.then_some(c))
            .collect();

        let bundle = ContextBundle {
            entries,
            estimated_tokens: used,
            truncated: selected_count < n,
            over_budget: used > config.max_tokens,
            safety_count,
            candidate_count: n,
        };

        info!(
            selected = bundle.len(),
            candidates = n,
            total_tokens = bundle.estimated_tokens,
            truncated = bundle.truncated,
            over_budget = bundle.over_budget,
            "Context bundle built"
        );
        bundle
    }

    /// Enriches every candidate (after the system hard filter) with classification, score and cost.
    pub fn score_all(
        &self,
        messages: &[Message],
        config: &SelectionConfig,
        now: DateTime<Utc>,
    ) -> Vec<ScoredMessage> {
        let current_topics = self.current_topics(messages, config.topic_window);
        messages
            .iter()
            .enumerate()
            .filter(|(_, m)| !(config.filters_system_messages() && m.role == MessageRole::System))
            .map(|(index, message)| {
                let classification = self.classifier.classify_message(message);
                let score =
                    self.scorer
                        .score(message, &classification, config, &current_topics, now);
                let cost = self.estimator.estimate(&message.text);
                ScoredMessage::new(message, index, classification, score, cost)
            })
            .collect()
    }

    /// Topics of the last `window` messages.
    pub fn current_topics(&self, messages: &[Message], window: usize) -> Vec<Topic> {
        let start = messages.len().saturating_sub(window);
        self.classifier
            .topics_of(messages[start..].iter().map(|m| m.text.as_str()))
    }
}
