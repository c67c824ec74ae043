//! Async controller around [`ConversationBuffer`].
//!
//! All writes go through one `RwLock`, so dedup-and-append runs as a single critical section.
//! Fetches run with the lock released; their results are applied only if the buffer is still
//! in the epoch the request was issued for.

use companion_core::{Message, SyncError};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::buffer::{ConversationBuffer, ReconcileOutcome};
use crate::source::HistorySource;

/// Result of [`ConversationSync::load_older`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOlderOutcome {
    /// This many older messages were prepended.
    Loaded(usize),
    /// No fetch was made: nothing older, not loaded yet, or a fetch already in flight.
    Skipped,
    /// The conversation changed while fetching; the result was dropped.
    Discarded,
}

/// Shared handle to the active conversation's buffer and its history source.
#[derive(Clone)]
pub struct ConversationSync {
    source: Arc<dyn HistorySource>,
    buffer: Arc<RwLock<ConversationBuffer>>,
}

impl ConversationSync {
    pub fn new(source: Arc<dyn HistorySource>) -> Self {
        Self {
            source,
            buffer: Arc::new(RwLock::new(ConversationBuffer::new())),
        }
    }

    /// Switches to `conversation_id` and loads its newest page.
    ///
    /// The buffer is reset before the fetch, so the old conversation is gone even if the fetch
    /// fails. Returns the number of messages loaded.
    #[instrument(skip(self))]
    pub async fn activate(&self, conversation_id: &str) -> Result<usize, SyncError> {
        let epoch = {
            let mut buffer = self.buffer.write().await;
            buffer.activate(conversation_id);
            buffer.epoch()
        };

        let result = self.source.fetch_page(conversation_id, None).await;

        let mut buffer = self.buffer.write().await;
        if buffer.epoch() != epoch {
            warn!(
                conversation_id,
                request_epoch = epoch,
                current_epoch = buffer.epoch(),
                "Discarding stale initial page"
            );
            return Err(SyncError::StaleResponse {
                expected_epoch: buffer.epoch(),
                actual_epoch: epoch,
            });
        }
        match result {
            Ok(page) => Ok(buffer.load_initial(page)),
            Err(e) => {
                warn!(conversation_id, error = %e, "Initial history fetch failed");
                Err(SyncError::Fetch(format!("{:#}", e)))
            }
        }
    }

    /// Fetches the next older page. Re-entrant calls while a fetch is in flight are no-ops.
    #[instrument(skip(self))]
    pub async fn load_older(&self) -> Result<LoadOlderOutcome, SyncError> {
        let request = {
            let mut buffer = self.buffer.write().await;
            match buffer.begin_load_older() {
                Some(request) => request,
                None => return Ok(LoadOlderOutcome::Skipped),
            }
        };

        debug!(
            conversation_id = %request.conversation_id,
            epoch = request.epoch,
            cursor = ?request.cursor,
            "Fetching older page"
        );
        let result = self
            .source
            .fetch_page(&request.conversation_id, request.cursor.as_ref())
            .await
            .map_err(|e| SyncError::Fetch(format!("{:#}", e)));

        let mut buffer = self.buffer.write().await;
        match buffer.complete_load_older(&request, result) {
            Ok(count) => Ok(LoadOlderOutcome::Loaded(count)),
            Err(SyncError::StaleResponse { .. }) => Ok(LoadOlderOutcome::Discarded),
            Err(e) => Err(e),
        }
    }

    /// Applies a live delivery for `conversation_id`; deliveries for any other conversation
    /// are ignored.
    pub async fn apply_live(&self, conversation_id: &str, batch: &[Message]) -> ReconcileOutcome {
        let mut buffer = self.buffer.write().await;
        if buffer.conversation_id() != Some(conversation_id) {
            debug!(
                conversation_id,
                active = ?buffer.conversation_id(),
                "Ignoring live batch for inactive conversation"
            );
            return ReconcileOutcome::Ignored;
        }
        buffer.reconcile_live(batch)
    }

    /// Pumps live deliveries from `rx` into the buffer until the channel closes.
    pub fn spawn_live_feed(
        &self,
        conversation_id: String,
        mut rx: mpsc::Receiver<Vec<Message>>,
    ) -> JoinHandle<()> {
        let sync = self.clone();
        tokio::spawn(async move {
            while let Some(batch) = rx.recv().await {
                let outcome = sync.apply_live(&conversation_id, &batch).await;
                debug!(conversation_id = %conversation_id, ?outcome, "Live batch applied");
            }
            info!(conversation_id = %conversation_id, "Live feed closed");
        })
    }

    /// Clears the buffer and detaches from the conversation. In-flight fetches are discarded.
    pub async fn reset(&self) {
        self.buffer.write().await.reset();
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.buffer.read().await.to_vec()
    }

    pub async fn has_more_older(&self) -> bool {
        self.buffer.read().await.has_more_older()
    }

    pub async fn is_loading_more(&self) -> bool {
        self.buffer.read().await.is_loading_more()
    }

    pub async fn conversation_id(&self) -> Option<String> {
        self.buffer.read().await.conversation_id().map(str::to_string)
    }

    pub async fn epoch(&self) -> u64 {
        self.buffer.read().await.epoch()
    }

    /// Runs `f` against the buffer under the read lock.
    pub async fn inspect<R>(&self, f: impl FnOnce(&ConversationBuffer) -> R) -> R {
        f(&*self.buffer.read().await)
    }
}
