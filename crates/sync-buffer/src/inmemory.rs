//! In-memory [`HistorySource`] for tests, demos and the CLI.
//!
//! Conversations are append-only vectors; a cursor is the absolute index of the oldest
//! message already delivered, so cursors stay valid while new messages arrive.

use async_trait::async_trait;
use companion_core::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::source::{Cursor, HistorySource, MessagePage};

/// Default number of messages per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct InMemoryHistorySource {
    conversations: Arc<RwLock<HashMap<String, Vec<Message>>>>,
    page_size: usize,
}

impl Default for InMemoryHistorySource {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl InMemoryHistorySource {
    pub fn new(page_size: usize) -> Self {
        Self {
            conversations: Arc::new(RwLock::new(HashMap::new())),
            page_size: page_size.max(1),
        }
    }

    /// Appends messages to a conversation (creating it if needed).
    pub async fn extend<I>(&self, conversation_id: &str, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        let mut conversations = self.conversations.write().await;
        conversations
            .entry(conversation_id.to_string())
            .or_default()
            .extend(messages);
    }

    pub async fn push(&self, conversation_id: &str, message: Message) {
        self.extend(conversation_id, [message]).await;
    }

    /// The newest page, as the live query would deliver it.
    pub async fn latest_window(&self, conversation_id: &str) -> Vec<Message> {
        let conversations = self.conversations.read().await;
        conversations
            .get(conversation_id)
            .map(|all| all[all.len().saturating_sub(self.page_size)..].to_vec())
            .unwrap_or_default()
    }

    pub async fn len(&self, conversation_id: &str) -> usize {
        let conversations = self.conversations.read().await;
        conversations.get(conversation_id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl HistorySource for InMemoryHistorySource {
    async fn fetch_page(
        &self,
        conversation_id: &str,
        cursor: Option<&Cursor>,
    ) -> Result<MessagePage, anyhow::Error> {
        let conversations = self.conversations.read().await;
        let all = conversations
            .get(conversation_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let end = match cursor {
            None => all.len(),
            Some(c) => c
                .as_str()
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("Invalid cursor {:?}: {}", c.as_str(), e))?
                .min(all.len()),
        };
        let start = end.saturating_sub(self.page_size);
        let has_more = start > 0;

        debug!(
            conversation_id,
            start,
            end,
            has_more,
            "InMemoryHistorySource: serving page"
        );

        Ok(MessagePage {
            messages: all[start..end].to_vec(),
            next_cursor: has_more.then(|| Cursor(start.to_string())),
            has_more,
        })
    }
}
