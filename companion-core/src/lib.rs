//! # companion-core
//!
//! Shared message model for the conversation context subsystem: [`Message`], roles, sentiment,
//! language and topic tags, the sync/dispatch error taxonomy, and tracing initialisation.
//! Used by the classifier, context, sync-buffer, generation-client and send-pipeline crates.

pub mod error;
pub mod logger;
pub mod types;

pub use error::{DispatchError, SyncError, UnknownLanguage};
pub use logger::{init_tracing, truncate_for_log};
pub use types::{Language, Message, MessageRole, Sentiment, Topic};
