//! # Sync buffer
//!
//! Keeps one authoritative, deduplicated, chronologically ordered view of the active
//! conversation while paginated history loads, live pushes and conversation switches
//! compete to change it.
//!
//! - [`ConversationBuffer`] – synchronous state machine
//!   (`Uninitialized → Loaded ⇄ Paginating`, reset from any state)
//! - [`ConversationSync`] – async controller: serialised writes, epoch-tagged fetches,
//!   stale-result discard, live feed pump
//! - [`HistorySource`] – backend paginated query seam; [`InMemoryHistorySource`] for tests
//!
//! Live reconciliation compares ids, not lengths, so overlapping or reordered redelivery
//! never duplicates a message.

mod buffer;
mod controller;
mod inmemory;
mod source;


pub use buffer::{BufferState, ConversationBuffer, OlderPageRequest, ReconcileOutcome};
pub use controller::{ConversationSync, LoadOlderOutcome};
pub use inmemory::{InMemoryHistorySource, DEFAULT_PAGE_SIZE};
pub use source::{Cursor, HistorySource, MessagePage};
