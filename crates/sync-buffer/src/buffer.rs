//! Conversation buffer: the single ordered, deduplicated view of one conversation's messages.
//!
//! Three writers compete for it: the initial/paginated history loads, live pushes, and
//! conversation switches. The buffer itself is synchronous; callers serialise access
//! (see [`crate::ConversationSync`]).
//!
//! Invariants:
//! - ids are unique (`known_ids` mirrors `entries`);
//! - `entries` is sorted by `(timestamp, arrival sequence)`;
//! - every pagination request carries the epoch it was issued in, and a completion from an
//!   older epoch never mutates state.

use companion_core::{Message, SyncError};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::source::{Cursor, MessagePage};

/// Lifecycle state derived from the buffer's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Uninitialized,
    Loaded,
    Paginating,
}

/// Result of applying a live batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Genuinely new messages were appended.
    Appended(usize),
    /// No new ids but the batch size differed, so the buffer was replaced wholesale.
    Replaced(usize),
    Unchanged,
    /// The batch was for a conversation that is not active.
    Ignored,
}

/// A pagination fetch issued by [`ConversationBuffer::begin_load_older`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OlderPageRequest {
    pub conversation_id: String,
    pub epoch: u64,
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Clone)]
struct Entry {
    message: Message,
    seq: i64,
}

#[derive(Debug, Default)]
pub struct ConversationBuffer {
    conversation_id: Option<String>,
    epoch: u64,
    entries: Vec<Entry>,
    known_ids: HashSet<String>,
    cursor: Option<Cursor>,
    has_more_older: bool,
    loaded_initial: bool,
    loading_more: bool,
    /// Next sequence for appended messages; prepended ones count down from `min_seq`.
    next_seq: i64,
    min_seq: i64,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reset buffer bound to `conversation_id`.
    pub fn for_conversation(conversation_id: &str) -> Self {
        let mut buffer = Self::new();
        buffer.activate(conversation_id);
        buffer
    }

    /// Resets and binds the buffer to a conversation (switch or new conversation).
    pub fn activate(&mut self, conversation_id: &str) {
        self.reset();
        self.conversation_id = Some(conversation_id.to_string());
        info!(conversation_id, epoch = self.epoch, "Conversation buffer activated");
    }

    /// Clears messages, cursor, flags and the id set in one step and starts a new epoch.
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            ..Self::default()
        };
        debug!(epoch, "Conversation buffer reset");
    }

    /// Replaces the buffer with the first page. Duplicate ids inside the page keep the first.
    pub fn load_initial(&mut self, page: MessagePage) -> usize {
        self.entries.clear();
        self.known_ids.clear();
        self.next_seq = 0;
        self.min_seq = 0;
        let count = self.append_new(page.messages);
        self.cursor = page.next_cursor;
        self.has_more_older = page.has_more;
        self.loaded_initial = true;
        info!(
            conversation_id = ?self.conversation_id,
            message_count = count,
            has_more_older = self.has_more_older,
            "Initial history loaded"
        );
        count
    }

    /// Marks a pagination fetch as in flight and returns what to fetch.
    ///
    /// Returns `None` (and changes nothing) before the initial load, when nothing older
    /// exists, or when a fetch is already in flight.
    pub fn begin_load_older(&mut self) -> Option<OlderPageRequest> {
        if !self.loaded_initial || !self.has_more_older || self.loading_more {
            debug!(
                loaded_initial = self.loaded_initial,
                has_more_older = self.has_more_older,
                loading_more = self.loading_more,
                "load_older skipped"
            );
            return None;
        }
        let conversation_id = self.conversation_id.clone()?;
        self.loading_more = true;
        Some(OlderPageRequest {
            conversation_id,
            epoch: self.epoch,
            cursor: self.cursor.clone(),
        })
    }

    /// Applies the outcome of a pagination fetch.
    ///
    /// A request from another epoch returns [`SyncError::StaleResponse`] and touches nothing.
    /// A failed fetch clears the loading flag only. A page is prepended (skipping known ids)
    /// and advances the cursor.
    pub fn complete_load_older(
        &mut self,
        request: &OlderPageRequest,
        result: Result<MessagePage, SyncError>,
    ) -> Result<usize, SyncError> {
        if request.epoch != self.epoch
            || self.conversation_id.as_deref() != Some(request.conversation_id.as_str())
        {
            warn!(
                request_conversation = %request.conversation_id,
                request_epoch = request.epoch,
                current_epoch = self.epoch,
                "Discarding stale pagination response"
            );
            return Err(SyncError::StaleResponse {
                expected_epoch: self.epoch,
                actual_epoch: request.epoch,
            });
        }

        self.loading_more = false;
        let page = result.map_err(|e| {
            warn!(error = %e, "Pagination fetch failed; buffer unchanged");
            e
        })?;

        let fresh = self.unique_new(page.messages);
        let count = fresh.len();
        let first_seq = self.min_seq - count as i64;
        for (offset, message) in fresh.into_iter().enumerate() {
            self.known_ids.insert(message.id.clone());
            self.entries.push(Entry {
                message,
                seq: first_seq + offset as i64,
            });
        }
        self.min_seq = first_seq;
        self.sort();

        self.cursor = page.next_cursor;
        self.has_more_older = page.has_more;
        info!(
            prepended = count,
            total = self.entries.len(),
            has_more_older = self.has_more_older,
            "Older history loaded"
        );
        Ok(count)
    }

    /// Reconciles a live delivery by id membership.
    ///
    /// Genuinely new ids are appended in delivery order. If nothing is new but the batch size
    /// differs from the buffer size, the buffer is replaced by the batch wholesale; this can
    /// drop older pages that the backend window no longer includes.
    pub fn reconcile_live(&mut self, batch: &[Message]) -> ReconcileOutcome {
        let fresh = self.unique_new(batch.iter().cloned());
        if !fresh.is_empty() {
            let count = self.append_new(fresh);
            debug!(appended = count, total = self.entries.len(), "Live batch appended");
            return ReconcileOutcome::Appended(count);
        }

        let batch = dedup_by_id(batch.iter().cloned());
        if batch.len() != self.entries.len() {
            warn!(
                buffer_len = self.entries.len(),
                batch_len = batch.len(),
                "Live batch has no new ids but a different size; replacing buffer"
            );
            self.entries.clear();
            self.known_ids.clear();
            self.next_seq = 0;
            self.min_seq = 0;
            let count = self.append_new(batch);
            return ReconcileOutcome::Replaced(count);
        }

        ReconcileOutcome::Unchanged
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> BufferState {
        if !self.loaded_initial {
            BufferState::Uninitialized
        } else if self.loading_more {
            BufferState::Paginating
        } else {
            BufferState::Loaded
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(|e| &e.message)
    }

    /// Owned copy of the ordered message list.
    pub fn to_vec(&self) -> Vec<Message> {
        self.messages().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known_ids.contains(id)
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn has_more_older(&self) -> bool {
        self.has_more_older
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn loaded_initial(&self) -> bool {
        self.loaded_initial
    }

    /// Messages whose id is not yet known, deduplicated, in input order.
    fn unique_new<I>(&self, messages: I) -> Vec<Message>
    where
        I: IntoIterator<Item = Message>,
    {
        dedup_by_id(messages.into_iter().filter(|m| !self.known_ids.contains(&m.id)))
    }

    /// Appends messages with increasing arrival sequence, then restores ordering.
    fn append_new<I>(&mut self, messages: I) -> usize
    where
        I: IntoIterator<Item = Message>,
    {
        let mut count = 0;
        for message in messages {
            if !self.known_ids.insert(message.id.clone()) {
                continue;
            }
            self.entries.push(Entry {
                message,
                seq: self.next_seq,
            });
            self.next_seq += 1;
            count += 1;
        }
        self.sort();
        count
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            a.message
                .timestamp
                .cmp(&b.message.timestamp)
                .then(a.seq.cmp(&b.seq))
        });
    }
}

fn dedup_by_id<I>(messages: I) -> Vec<Message>
where
    I: IntoIterator<Item = Message>,
{
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}
