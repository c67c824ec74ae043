//! Paginated history query: the backend seam the buffer loads from.
//!
//! The same query is re-delivered by the backend on every underlying change; those pushes
//! reach the buffer through `reconcile_live`, while explicit fetches go through
//! [`HistorySource::fetch_page`].

use async_trait::async_trait;
use companion_core::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque pagination marker for the oldest loaded boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of history, messages in ascending chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Cursor for the next older page; `None` when there is nothing older.
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}

impl MessagePage {
    pub fn new(messages: Vec<Message>, next_cursor: Option<Cursor>, has_more: bool) -> Self {
        Self {
            messages,
            next_cursor,
            has_more,
        }
    }

    /// A complete history with nothing older.
    pub fn complete(messages: Vec<Message>) -> Self {
        Self::new(messages, None, false)
    }
}

/// Backend query `(conversation_id, cursor?) -> page`.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetches the newest page when `cursor` is `None`, otherwise the page just older than `cursor`.
    async fn fetch_page(
        &self,
        conversation_id: &str,
        cursor: Option<&Cursor>,
    ) -> Result<MessagePage, anyhow::Error>;
}
