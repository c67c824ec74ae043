//! Per-send telemetry record and sinks.
//!
//! A record is emitted once per send, success or failure. Emission runs on its own task: a
//! slow or failing sink never delays or fails the send.

use anyhow::Result;
use async_trait::async_trait;
use companion_core::Language;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Wall-clock time spent in each phase of a send, in milliseconds. Phases that did not run
/// are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDurations {
    pub classification_ms: f64,
    pub bundle_ms: f64,
    pub dispatch_ms: f64,
    pub total_ms: f64,
}

pub(crate) fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Structured record of one send.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTelemetry {
    pub send_id: Uuid,
    pub conversation_id: String,
    /// Input length in characters.
    pub message_length: usize,
    pub language: Language,
    pub chat_mode: String,
    /// Number of prior turns forwarded.
    pub context_size: usize,
    pub context_tokens: usize,
    pub phase_durations: PhaseDurations,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_class: Option<String>,
}

/// Destination for send telemetry.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn record(&self, event: &SendTelemetry) -> Result<()>;
}

/// Writes each record as a single `tracing` event under the `telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetrySink;

#[async_trait]
impl TelemetrySink for TracingTelemetrySink {
    async fn record(&self, event: &SendTelemetry) -> Result<()> {
        let phases = &event.phase_durations;
        info!(
            target: "telemetry",
            send_id = %event.send_id,
            conversation_id = %event.conversation_id,
            message_length = event.message_length,
            language = %event.language,
            chat_mode = %event.chat_mode,
            context_size = event.context_size,
            context_tokens = event.context_tokens,
            classification_ms = phases.classification_ms,
            bundle_ms = phases.bundle_ms,
            dispatch_ms = phases.dispatch_ms,
            total_ms = phases.total_ms,
            success = event.success,
            error_class = event.error_class.as_deref().unwrap_or(""),
            "send"
        );
        Ok(())
    }
}

/// Records `event`, logging instead of returning any sink failure.
pub async fn emit(sink: &dyn TelemetrySink, event: &SendTelemetry) {
    if let Err(e) = sink.record(event).await {
        warn!(send_id = %event.send_id, error = %e, "Telemetry emission failed");
    }
}

/// Detaches [`emit`] onto the runtime. The caller does not wait for the sink.
pub fn spawn_emit(sink: Arc<dyn TelemetrySink>, event: SendTelemetry) -> JoinHandle<()> {
    tokio::spawn(async move { emit(sink.as_ref(), &event).await })
}
