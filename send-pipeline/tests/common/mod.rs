//! Mock generation services and telemetry sinks for send-pipeline tests.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use companion_core::Message;
use generation_client::{GenerationRequest, GenerationResponse, GenerationService};
use send_pipeline::{SendTelemetry, TelemetrySink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Alternating user/assistant messages `{prefix}-0..`, one minute apart, ending at `base_time()`.
#[allow(dead_code)]
pub fn history(prefix: &str, count: usize) -> Vec<Message> {
    let start = base_time() - Duration::minutes(count as i64);
    (0..count)
        .map(|i| {
            let id = format!("{prefix}-{i}");
            let ts = start + Duration::minutes(i as i64);
            if i % 2 == 0 {
                Message::user(id, format!("how was the day number {i}"), ts)
            } else {
                Message::assistant(id, format!("it went fine, thanks for asking {i}"), ts)
            }
        })
        .collect()
}

/// Records every request; fails while `fail` is set.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockGenerationService {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub fail: AtomicBool,
}

#[allow(dead_code)]
impl MockGenerationService {
    pub fn failing() -> Self {
        let service = Self::default();
        service.fail.store(true, Ordering::SeqCst);
        service
    }

    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<GenerationResponse> {
        self.requests.lock().await.push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("upstream timeout"));
        }
        Ok(GenerationResponse {
            content: format!("echo: {}", request.content),
            message_id: None,
        })
    }
}

/// Blocks every request until released, then fails or succeeds per `fail`.
#[allow(dead_code)]
pub struct GatedGenerationService {
    pub started: Arc<Notify>,
    pub gate: Arc<Notify>,
    pub fail: AtomicBool,
}

#[allow(dead_code)]
impl GatedGenerationService {
    pub fn new(fail: bool) -> Self {
        Self {
            started: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
            fail: AtomicBool::new(fail),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl GenerationService for GatedGenerationService {
    async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<GenerationResponse> {
        self.started.notify_one();
        self.gate.notified().await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset"));
        }
        Ok(GenerationResponse::default())
    }
}

#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingTelemetrySink {
    pub events: Mutex<Vec<SendTelemetry>>,
}

#[allow(dead_code)]
impl RecordingTelemetrySink {
    pub async fn events(&self) -> Vec<SendTelemetry> {
        self.events.lock().await.clone()
    }

    /// Waits until at least `count` records arrived. Emission runs on a detached task.
    pub async fn wait_for(&self, count: usize) -> Vec<SendTelemetry> {
        let poll = async {
            loop {
                let events = self.events().await;
                if events.len() >= count {
                    return events;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(std::time::Duration::from_secs(2), poll)
            .await
            .unwrap_or_else(|_| panic!("expected {count} telemetry records"))
    }
}

#[async_trait]
impl TelemetrySink for RecordingTelemetrySink {
    async fn record(&self, event: &SendTelemetry) -> anyhow::Result<()> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

/// Never finishes recording.
#[allow(dead_code)]
pub struct HangingTelemetrySink;

#[async_trait]
impl TelemetrySink for HangingTelemetrySink {
    async fn record(&self, _event: &SendTelemetry) -> anyhow::Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

#[allow(dead_code)]
pub struct FailingTelemetrySink;

#[async_trait]
impl TelemetrySink for FailingTelemetrySink {
    async fn record(&self, _event: &SendTelemetry) -> anyhow::Result<()> {
        Err(anyhow!("telemetry collector unavailable"))
    }
}
