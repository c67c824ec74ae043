//! Integration tests for [`sync_buffer::ConversationSync`]: pagination, re-entrancy guard,
//! failure handling, live reconciliation and stale-result discard across conversation switches.

mod common;

use chrono::Duration;
use companion_core::{Message, SyncError};
use std::sync::Arc;
use sync_buffer::{ConversationSync, InMemoryHistorySource, LoadOlderOutcome, ReconcileOutcome};
use tokio::sync::{mpsc, Mutex};

fn ids(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.clone()).collect()
}

/// **Test: paging walks back to the start, then becomes a no-op.**
///
/// **Setup:** 5 messages, page size 2, counting source.
/// **Action:** activate, then load_older three times.
/// **Expected:** 2 + 2 + 1 messages loaded in order; the third call makes no fetch.
#[tokio::test]
async fn test_load_older_pages_until_exhausted() {
    let inner = InMemoryHistorySource::new(2);
    inner.extend("conv-a", common::messages("a", 5)).await;
    let source = Arc::new(common::CountingSource::new(inner));
    let sync = ConversationSync::new(source.clone());

    assert_eq!(sync.activate("conv-a").await, Ok(2));
    assert!(sync.has_more_older().await);
    assert_eq!(sync.load_older().await, Ok(LoadOlderOutcome::Loaded(2)));
    assert_eq!(sync.load_older().await, Ok(LoadOlderOutcome::Loaded(1)));
    assert!(!sync.has_more_older().await);

    let fetches = source.fetch_count();
    let before = sync.messages().await;
    assert_eq!(sync.load_older().await, Ok(LoadOlderOutcome::Skipped));
    assert_eq!(source.fetch_count(), fetches, "no fetch when nothing older");
    assert_eq!(sync.messages().await, before);
    assert_eq!(ids(&before), vec!["a-0", "a-1", "a-2", "a-3", "a-4"]);
}

/// **Test: a second load_older while one is in flight is a no-op.**
#[tokio::test]
async fn test_load_older_is_reentrancy_guarded() {
    let inner = InMemoryHistorySource::new(2);
    inner.extend("conv-a", common::messages("a", 4)).await;
    let source = Arc::new(common::GatedSource::new(inner));
    let sync = ConversationSync::new(source.clone());
    sync.activate("conv-a").await.unwrap();

    let pending = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.load_older().await })
    };
    source.started.notified().await;
    assert!(sync.is_loading_more().await);
    assert_eq!(sync.load_older().await, Ok(LoadOlderOutcome::Skipped));

    source.release();
    assert_eq!(pending.await.unwrap(), Ok(LoadOlderOutcome::Loaded(2)));
    assert!(!sync.is_loading_more().await);
    assert_eq!(sync.messages().await.len(), 4);
}

/// **Test: a pagination response for a previous conversation never touches the new one.**
///
/// **Setup:** conversation A active with older history; its load_older is blocked mid-fetch.
/// **Action:** switch to conversation B, then let A's fetch resolve.
/// **Expected:** outcome Discarded; B's messages and flags are unchanged.
#[tokio::test]
async fn test_stale_pagination_after_switch_is_discarded() {
    let inner = InMemoryHistorySource::new(2);
    inner.extend("conv-a", common::messages("a", 5)).await;
    inner.extend("conv-b", common::messages("b", 2)).await;
    let source = Arc::new(common::GatedSource::new(inner));
    let sync = ConversationSync::new(source.clone());
    sync.activate("conv-a").await.unwrap();

    let pending = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.load_older().await })
    };
    source.started.notified().await;

    sync.activate("conv-b").await.unwrap();
    let b_before = sync.messages().await;
    assert_eq!(ids(&b_before), vec!["b-0", "b-1"]);

    source.release();
    assert_eq!(pending.await.unwrap(), Ok(LoadOlderOutcome::Discarded));
    assert_eq!(sync.messages().await, b_before);
    assert_eq!(sync.conversation_id().await.as_deref(), Some("conv-b"));
    assert!(!sync.is_loading_more().await);
    assert!(!sync.has_more_older().await);
}

/// **Test: failed pagination leaves history intact and can be retried.**
#[tokio::test]
async fn test_failed_load_older_is_retryable() {
    let inner = InMemoryHistorySource::new(2);
    inner.extend("conv-a", common::messages("a", 3)).await;
    let source = Arc::new(common::FlakySource {
        inner,
        fail_next: Mutex::new(true),
    });
    let sync = ConversationSync::new(source.clone());
    sync.activate("conv-a").await.unwrap();
    let before = sync.messages().await;

    let result = sync.load_older().await;
    assert!(matches!(result, Err(SyncError::Fetch(ref e)) if e.contains("network unreachable")));
    assert_eq!(sync.messages().await, before);
    assert!(!sync.is_loading_more().await);
    assert!(sync.has_more_older().await);

    *source.fail_next.lock().await = false;
    assert_eq!(sync.load_older().await, Ok(LoadOlderOutcome::Loaded(1)));
    assert_eq!(sync.messages().await.len(), 3);
}

/// **Test: live deliveries reconcile by id and only for the active conversation.**
#[tokio::test]
async fn test_apply_live_appends_new_and_ignores_other_conversations() {
    let source = InMemoryHistorySource::default();
    source.extend("conv-a", common::messages("a", 5)).await;
    let sync = ConversationSync::new(Arc::new(source.clone()));
    sync.activate("conv-a").await.unwrap();

    let last = sync.messages().await.last().unwrap().timestamp;
    source
        .push("conv-a", Message::assistant("reply", "I'm here.", last + Duration::minutes(1)))
        .await;
    let window = source.latest_window("conv-a").await;

    assert_eq!(sync.apply_live("conv-a", &window).await, ReconcileOutcome::Appended(1));
    assert_eq!(sync.apply_live("conv-a", &window).await, ReconcileOutcome::Unchanged);
    assert_eq!(sync.apply_live("conv-z", &window).await, ReconcileOutcome::Ignored);

    let messages = sync.messages().await;
    assert_eq!(messages.len(), 6);
    assert_eq!(messages.last().unwrap().id, "reply");
}

/// **Test: the live feed task pumps batches until the channel closes.**
#[tokio::test]
async fn test_live_feed_applies_batches() {
    let source = InMemoryHistorySource::default();
    source.extend("conv-a", common::messages("a", 2)).await;
    let sync = ConversationSync::new(Arc::new(source));
    sync.activate("conv-a").await.unwrap();

    let (tx, rx) = mpsc::channel(4);
    let handle = sync.spawn_live_feed("conv-a".to_string(), rx);
    let mut batch = sync.messages().await;
    let ts = batch.last().unwrap().timestamp + Duration::minutes(1);
    batch.push(Message::user("live-1", "typing from another device", ts));
    tx.send(batch.clone()).await.unwrap();
    tx.send(batch).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    assert_eq!(
        ids(&sync.messages().await),
        vec!["a-0", "a-1", "live-1"]
    );
}

/// **Test: reset detaches and clears.**
#[tokio::test]
async fn test_reset_clears_state() {
    let source = InMemoryHistorySource::new(2);
    source.extend("conv-a", common::messages("a", 4)).await;
    let sync = ConversationSync::new(Arc::new(source));
    sync.activate("conv-a").await.unwrap();
    let epoch = sync.epoch().await;

    sync.reset().await;
    assert!(sync.messages().await.is_empty());
    assert!(!sync.has_more_older().await);
    assert_eq!(sync.conversation_id().await, None);
    assert_eq!(sync.epoch().await, epoch + 1);
    assert_eq!(sync.load_older().await, Ok(LoadOlderOutcome::Skipped));
}
