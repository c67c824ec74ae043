//! # Context
//!
//! Chooses which prior conversation turns are forwarded to the generation service.
//!
//! - [`estimator`] – per-script token cost estimation
//! - [`scorer`] – additive, term-by-term relevance scoring
//! - [`selector`] – budget packing with a safety floor and a continuity tail
//! - [`config`] – [`SelectionConfig`] and tunable [`ScoringWeights`]
//!
//! Everything here is pure: selection never fails, and policy overrides (safety floor,
//! continuity) are reported on the bundle rather than as errors.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use companion_core::Message;
//! use context::{ContextSelector, SelectionConfig};
//!
//! let history = vec![
//!     Message::user("1", "I had a rough day at work", Utc::now()),
//!     Message::assistant("2", "I'm sorry to hear that. What happened?", Utc::now()),
//! ];
//! let bundle = ContextSelector::default()
//!     .optimize(&history, &SelectionConfig::default().with_max_tokens(100));
//! assert_eq!(bundle.len(), 2);
//! ```

pub mod config;
pub mod estimator;
pub mod scorer;
pub mod selector;
pub mod types;

#[cfg(test)]
mod estimator_test;

pub use config::{ScoringWeights, SelectionConfig};
pub use estimator::{estimate_tokens, TokenEstimator};
pub use scorer::{RelevanceScorer, ScoreBreakdown};
pub use selector::ContextSelector;
pub use types::{ContextBundle, ScoredMessage};
