//! Display-layer facade: one active conversation, its sync buffer, and the send pipeline.
//!
//! Besides the message list the session owns the user's draft and a typing indicator. A send
//! takes the draft, shows the indicator, and on failure puts the draft back, but only if the
//! user is still in the conversation the send was made from.

use companion_core::{DispatchError, Message, SyncError};
use std::sync::Arc;
use sync_buffer::{ConversationSync, HistorySource, LoadOlderOutcome, ReconcileOutcome};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::coordinator::{SendCoordinator, SendOutcome};

#[derive(Debug, Default)]
struct Composer {
    draft: String,
    in_flight: usize,
    last_error: Option<DispatchError>,
}

#[derive(Clone)]
pub struct ChatSession {
    sync: ConversationSync,
    coordinator: Arc<SendCoordinator>,
    composer: Arc<RwLock<Composer>>,
}

impl ChatSession {
    pub fn new(source: Arc<dyn HistorySource>, coordinator: Arc<SendCoordinator>) -> Self {
        Self::with_sync(ConversationSync::new(source), coordinator)
    }

    pub fn with_sync(sync: ConversationSync, coordinator: Arc<SendCoordinator>) -> Self {
        Self {
            sync,
            coordinator,
            composer: Arc::new(RwLock::new(Composer::default())),
        }
    }

    pub fn sync(&self) -> &ConversationSync {
        &self.sync
    }

    /// Makes `conversation_id` active and loads its newest page. The draft is discarded.
    pub async fn switch_conversation(&self, conversation_id: &str) -> Result<usize, SyncError> {
        self.clear_composer().await;
        self.sync.activate(conversation_id).await
    }

    /// Leaves the current conversation (new-conversation flow).
    pub async fn reset(&self) {
        self.clear_composer().await;
        self.sync.reset().await;
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.sync.messages().await
    }

    pub async fn has_more_older(&self) -> bool {
        self.sync.has_more_older().await
    }

    pub async fn is_loading_more(&self) -> bool {
        self.sync.is_loading_more().await
    }

    pub async fn conversation_id(&self) -> Option<String> {
        self.sync.conversation_id().await
    }

    /// Loads the next older page; errors leave history intact and can be retried.
    ///
    /// Without an active conversation (before the first switch or after [`reset`](Self::reset))
    /// this is a no-op returning [`LoadOlderOutcome::Skipped`].
    pub async fn load_older(&self) -> Result<LoadOlderOutcome, SyncError> {
        self.sync.load_older().await
    }

    pub async fn apply_live(&self, conversation_id: &str, batch: &[Message]) -> ReconcileOutcome {
        self.sync.apply_live(conversation_id, batch).await
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.composer.write().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.composer.read().await.draft.clone()
    }

    /// True while at least one send is in flight.
    pub async fn is_typing(&self) -> bool {
        self.composer.read().await.in_flight > 0
    }

    /// Error of the most recent failed send, cleared when the next send starts.
    pub async fn last_error(&self) -> Option<DispatchError> {
        self.composer.read().await.last_error.clone()
    }

    /// Sends the current draft.
    pub async fn send_draft(&self) -> Result<SendOutcome, DispatchError> {
        let text = self.draft().await;
        self.send(&text).await
    }

    /// Sends `text` with the current buffer as context.
    ///
    /// Conversation id, epoch and history are read from one buffer snapshot, so a concurrent
    /// switch cannot pair one conversation's id with another's messages. The reply is not
    /// appended here; it arrives through [`apply_live`](Self::apply_live).
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn send(&self, text: &str) -> Result<SendOutcome, DispatchError> {
        let snapshot = self
            .sync
            .inspect(|buffer| {
                buffer
                    .conversation_id()
                    .map(|id| (id.to_string(), buffer.epoch(), buffer.to_vec()))
            })
            .await;
        let (conversation_id, epoch, history) = match snapshot {
            Some(snapshot) => snapshot,
            None => {
                warn!("Send without an active conversation");
                let err = DispatchError::NoActiveConversation;
                let mut composer = self.composer.write().await;
                composer.draft = text.to_string();
                composer.last_error = Some(err.clone());
                return Err(err);
            }
        };

        {
            let mut composer = self.composer.write().await;
            composer.draft.clear();
            composer.in_flight += 1;
            composer.last_error = None;
        }

        let result = self
            .coordinator
            .send(&conversation_id, &history, text)
            .await;
        let same_conversation = self.sync.epoch().await == epoch;

        let mut composer = self.composer.write().await;
        composer.in_flight = composer.in_flight.saturating_sub(1);
        match &result {
            Ok(outcome) => {
                info!(send_id = %outcome.send_id, conversation_id, "Send completed");
            }
            Err(e) => {
                if same_conversation {
                    if composer.draft.is_empty() {
                        composer.draft = text.to_string();
                    }
                    composer.last_error = Some(e.clone());
                } else {
                    debug!(conversation_id, "Conversation changed during send; draft not restored");
                }
            }
        }
        result
    }

    async fn clear_composer(&self) {
        let mut composer = self.composer.write().await;
        composer.draft.clear();
        composer.last_error = None;
    }
}
