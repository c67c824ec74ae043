//! Shared test sources for sync-buffer integration tests.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use companion_core::Message;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sync_buffer::{Cursor, HistorySource, InMemoryHistorySource, MessagePage};
use tokio::sync::{Mutex, Notify};

/// `count` user messages `{prefix}-0..` one minute apart.
#[allow(dead_code)]
pub fn messages(prefix: &str, count: usize) -> Vec<Message> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            Message::user(
                format!("{prefix}-{i}"),
                format!("message {i}"),
                start + Duration::minutes(i as i64),
            )
        })
        .collect()
}

/// Wraps a source and counts fetches.
#[allow(dead_code)]
pub struct CountingSource {
    pub inner: InMemoryHistorySource,
    pub fetches: AtomicUsize,
}

#[allow(dead_code)]
impl CountingSource {
    pub fn new(inner: InMemoryHistorySource) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistorySource for CountingSource {
    async fn fetch_page(
        &self,
        conversation_id: &str,
        cursor: Option<&Cursor>,
    ) -> Result<MessagePage, anyhow::Error> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_page(conversation_id, cursor).await
    }
}

/// Serves from an inner source, but fetches with a cursor block until [`GatedSource::release`].
#[allow(dead_code)]
pub struct GatedSource {
    pub inner: InMemoryHistorySource,
    pub gate: Arc<Notify>,
    pub started: Arc<Notify>,
}

#[allow(dead_code)]
impl GatedSource {
    pub fn new(inner: InMemoryHistorySource) -> Self {
        Self {
            inner,
            gate: Arc::new(Notify::new()),
            started: Arc::new(Notify::new()),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl HistorySource for GatedSource {
    async fn fetch_page(
        &self,
        conversation_id: &str,
        cursor: Option<&Cursor>,
    ) -> Result<MessagePage, anyhow::Error> {
        if cursor.is_some() {
            self.started.notify_one();
            self.gate.notified().await;
        }
        self.inner.fetch_page(conversation_id, cursor).await
    }
}

/// Fails cursor fetches while `fail_next` is set.
#[allow(dead_code)]
pub struct FlakySource {
    pub inner: InMemoryHistorySource,
    pub fail_next: Mutex<bool>,
}

#[async_trait]
impl HistorySource for FlakySource {
    async fn fetch_page(
        &self,
        conversation_id: &str,
        cursor: Option<&Cursor>,
    ) -> Result<MessagePage, anyhow::Error> {
        if cursor.is_some() && *self.fail_next.lock().await {
            anyhow::bail!("network unreachable");
        }
        self.inner.fetch_page(conversation_id, cursor).await
    }
}
