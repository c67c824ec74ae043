//! Send pipeline: classify the input, pack context from the buffer, dispatch, record timings.
//!
//! The coordinator never appends the reply to the conversation. The backend delivers the
//! assistant message through the live feed, and the sync buffer is the only place it lands.

use chrono::{DateTime, Utc};
use classifier::{Classification, Classifier};
use companion_core::{truncate_for_log, DispatchError, Message};
use context::{ContextBundle, ContextSelector};
use generation_client::{
    GenerationRequest, GenerationResponse, GenerationService, RecentMessage, UserInfo,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::telemetry::{
    millis, spawn_emit, PhaseDurations, SendTelemetry, TelemetrySink, TracingTelemetrySink,
};

/// Successful send: what was forwarded and what the service answered.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub send_id: Uuid,
    pub classification: Classification,
    /// Bundle built over history plus the pending input.
    pub bundle: ContextBundle,
    pub request: GenerationRequest,
    pub response: GenerationResponse,
    pub telemetry: SendTelemetry,
}

pub struct SendCoordinator {
    selector: ContextSelector,
    generation: Arc<dyn GenerationService>,
    telemetry: Arc<dyn TelemetrySink>,
    config: PipelineConfig,
    user_info: Option<UserInfo>,
}

impl SendCoordinator {
    /// Coordinator with a classifier defaulting to `config.default_language` and telemetry
    /// written to tracing.
    pub fn new(generation: Arc<dyn GenerationService>, config: PipelineConfig) -> Self {
        Self {
            selector: ContextSelector::new(Classifier::new(config.default_language)),
            generation,
            telemetry: Arc::new(TracingTelemetrySink),
            config,
            user_info: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_selector(mut self, selector: ContextSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_user_info(mut self, user_info: UserInfo) -> Self {
        self.user_info = Some(user_info);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn selector(&self) -> &ContextSelector {
        &self.selector
    }

    /// Sends `text` in `conversation_id`, using `history` as the candidate context.
    pub async fn send(
        &self,
        conversation_id: &str,
        history: &[Message],
        text: &str,
    ) -> Result<SendOutcome, DispatchError> {
        self.send_at(conversation_id, history, text, Utc::now()).await
    }

    /// Like [`send`](Self::send) with recency and the input timestamp pinned to `now`.
    #[instrument(skip(self, history, text), fields(history_len = history.len(), text_len = text.len()))]
    pub async fn send_at(
        &self,
        conversation_id: &str,
        history: &[Message],
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<SendOutcome, DispatchError> {
        let send_id = Uuid::new_v4();
        let started = Instant::now();
        let mut phases = PhaseDurations::default();

        let mut record = SendTelemetry {
            send_id,
            conversation_id: conversation_id.to_string(),
            message_length: text.chars().count(),
            language: self.config.default_language,
            chat_mode: self.config.chat_mode.clone(),
            context_size: 0,
            context_tokens: 0,
            phase_durations: PhaseDurations::default(),
            success: false,
            error_class: None,
        };

        if text.trim().is_empty() {
            return Err(self.fail(record, phases, started, DispatchError::EmptyInput));
        }

        let phase = Instant::now();
        let classification = self.selector.classifier().classify(text);
        phases.classification_ms = millis(phase.elapsed());
        record.language = classification.language;

        let phase = Instant::now();
        let input = pending_input(send_id, text, now, &classification);
        let mut candidates = Vec::with_capacity(history.len() + 1);
        candidates.extend_from_slice(history);
        candidates.push(input.clone());
        let bundle = self
            .selector
            .optimize_at(&candidates, &self.config.selection, now);
        let recent_messages: Vec<RecentMessage> = bundle
            .messages()
            .filter(|m| m.id != input.id)
            .map(RecentMessage::from)
            .collect();
        phases.bundle_ms = millis(phase.elapsed());
        record.context_size = recent_messages.len();
        record.context_tokens = bundle.estimated_tokens;

        let request = GenerationRequest {
            conversation_id: conversation_id.to_string(),
            user_id: self.config.user_id.clone(),
            content: text.to_string(),
            language: classification.language,
            chat_mode: self.config.chat_mode.clone(),
            recent_messages,
            user_info: self.user_info.clone(),
        };

        info!(
            %send_id,
            conversation_id,
            content_preview = %truncate_for_log(text, 50),
            language = %classification.language,
            context_size = request.recent_messages.len(),
            context_tokens = bundle.estimated_tokens,
            "Dispatching send"
        );

        let phase = Instant::now();
        let result = self.generation.generate(&request).await;
        phases.dispatch_ms = millis(phase.elapsed());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                for (i, cause) in e.chain().enumerate() {
                    if i == 0 {
                        error!(%send_id, cause = %cause, "Generation request failed");
                    } else {
                        error!(%send_id, cause = %cause, "Caused by");
                    }
                }
                let err = DispatchError::Generation(format!("{:#}", e));
                return Err(self.fail(record, phases, started, err));
            }
        };

        phases.total_ms = millis(started.elapsed());
        record.phase_durations = phases;
        record.success = true;
        spawn_emit(Arc::clone(&self.telemetry), record.clone());

        Ok(SendOutcome {
            send_id,
            classification,
            bundle,
            request,
            response,
            telemetry: record,
        })
    }

    fn fail(
        &self,
        mut record: SendTelemetry,
        mut phases: PhaseDurations,
        started: Instant,
        err: DispatchError,
    ) -> DispatchError {
        phases.total_ms = millis(started.elapsed());
        record.phase_durations = phases;
        record.success = false;
        record.error_class = Some(err.error_class().to_string());
        spawn_emit(Arc::clone(&self.telemetry), record);
        err
    }
}

/// The input as a candidate message, so it anchors current topics and the continuity tail.
/// It is sent as `content`, never as a prior turn.
fn pending_input(
    send_id: Uuid,
    text: &str,
    now: DateTime<Utc>,
    classification: &Classification,
) -> Message {
    Message::user(format!("pending-{}", send_id), text, now)
        .with_language(classification.language)
        .with_topics(classification.topics.clone())
        .with_safety_flag(classification.safety_flag)
}
