//! Integration tests for [`send_pipeline::SendCoordinator`].

mod common;

use chrono::Duration;
use common::{
    FailingTelemetrySink, HangingTelemetrySink, MockGenerationService, RecordingTelemetrySink,
};
use companion_core::{DispatchError, Language, Message, Topic};
use context::SelectionConfig;
use send_pipeline::{PipelineConfig, SendCoordinator};
use std::sync::Arc;

fn coordinator(
    generation: Arc<MockGenerationService>,
    telemetry: Arc<RecordingTelemetrySink>,
    config: PipelineConfig,
) -> SendCoordinator {
    SendCoordinator::new(generation, config).with_telemetry(telemetry)
}

/// **Test: prior turns are forwarded in order and the input travels only as `content`.**
///
/// **Setup:** 4 short history messages, default budget.
/// **Action:** send "I feel anxious".
/// **Expected:** 4 recent messages in chronological order; request fields from config;
/// one successful telemetry record with contextSize 4.
#[tokio::test]
async fn test_send_forwards_history_and_records_telemetry() {
    let generation = Arc::new(MockGenerationService::default());
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let coordinator = coordinator(generation.clone(), telemetry.clone(), PipelineConfig::default());
    let history = common::history("h", 4);
    let now = common::base_time() + Duration::minutes(1);

    let outcome = coordinator
        .send_at("conv-1", &history, "I feel anxious", now)
        .await
        .unwrap();

    let requests = generation.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.conversation_id, "conv-1");
    assert_eq!(request.user_id, "anonymous");
    assert_eq!(request.chat_mode, "default");
    assert_eq!(request.content, "I feel anxious");
    assert_eq!(request.language, Language::English);
    let contents: Vec<&str> = request
        .recent_messages
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    let expected: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(contents, expected);

    assert!(outcome.classification.has_topic(Topic::Affect));
    assert_eq!(outcome.response.content, "echo: I feel anxious");

    let events = telemetry.wait_for(1).await;
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert!(event.success);
    assert_eq!(event.error_class, None);
    assert_eq!(event.message_length, 14);
    assert_eq!(event.context_size, 4);
    assert_eq!(event.send_id, outcome.send_id);
    assert!(event.phase_durations.total_ms >= event.phase_durations.dispatch_ms);
}

/// **Test: a flagged message survives a budget nothing else fits in.**
///
/// **Setup:** six 200-char messages (50 tokens each) and one short flagged message; budget 30.
/// **Action:** send "thanks".
/// **Expected:** only the flagged message is forwarded.
#[tokio::test]
async fn test_send_keeps_flagged_history_under_tight_budget() {
    let generation = Arc::new(MockGenerationService::default());
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let config = PipelineConfig {
        selection: SelectionConfig::default().with_max_tokens(30),
        ..PipelineConfig::default()
    };
    let coordinator = coordinator(generation.clone(), telemetry, config);

    let start = common::base_time() - Duration::minutes(10);
    let mut history: Vec<Message> = (0..6)
        .map(|i| {
            Message::user(
                format!("long-{i}"),
                "x".repeat(200),
                start + Duration::minutes(i as i64),
            )
        })
        .collect();
    history.insert(
        2,
        Message::user("flagged", "please remember this", start + Duration::seconds(90))
            .with_safety_flag(true),
    );

    let outcome = coordinator
        .send_at("conv-1", &history, "thanks", common::base_time())
        .await
        .unwrap();

    let request = &generation.requests().await[0];
    assert_eq!(request.recent_messages.len(), 1);
    assert_eq!(request.recent_messages[0].content, "please remember this");
    assert!(outcome.bundle.contains("flagged"));
    assert!(outcome.bundle.truncated);
    assert!(outcome.bundle.estimated_tokens <= 30);
}

/// **Test: generation failure is surfaced and recorded.**
#[tokio::test]
async fn test_generation_failure_is_surfaced() {
    let generation = Arc::new(MockGenerationService::failing());
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let coordinator = coordinator(generation.clone(), telemetry.clone(), PipelineConfig::default());

    let err = coordinator
        .send("conv-1", &common::history("h", 2), "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Generation(ref msg) if msg.contains("upstream timeout")));

    let events = telemetry.wait_for(1).await;
    assert_eq!(events.len(), 1);
    assert!(!events[0].success);
    assert_eq!(events[0].error_class.as_deref(), Some("generation"));
    assert_eq!(events[0].context_size, 2);
}

/// **Test: blank input is rejected before classification or dispatch.**
#[tokio::test]
async fn test_blank_input_is_rejected() {
    let generation = Arc::new(MockGenerationService::default());
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let coordinator = coordinator(generation.clone(), telemetry.clone(), PipelineConfig::default());

    let err = coordinator.send("conv-1", &[], "   ").await.unwrap_err();
    assert_eq!(err, DispatchError::EmptyInput);
    assert!(generation.requests().await.is_empty());

    let events = telemetry.wait_for(1).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].error_class.as_deref(), Some("empty_input"));
    assert_eq!(events[0].phase_durations.dispatch_ms, 0.0);
}

/// **Test: a broken telemetry sink never fails the send.**
#[tokio::test]
async fn test_telemetry_failure_does_not_fail_send() {
    let generation = Arc::new(MockGenerationService::default());
    let coordinator = SendCoordinator::new(generation.clone(), PipelineConfig::default())
        .with_telemetry(Arc::new(FailingTelemetrySink));

    let outcome = coordinator
        .send("conv-1", &common::history("h", 1), "hi")
        .await;
    assert!(outcome.is_ok());
    assert_eq!(generation.requests().await.len(), 1);
}

/// **Test: a sink that never completes does not hold up the send.**
///
/// **Setup:** telemetry sink whose `record` never resolves.
/// **Action:** one successful send and one failed send, each under a 2s timeout.
/// **Expected:** both return within the timeout with their normal results.
#[tokio::test]
async fn test_hanging_telemetry_sink_does_not_block_send() {
    let generation = Arc::new(MockGenerationService::default());
    let coordinator = SendCoordinator::new(generation.clone(), PipelineConfig::default())
        .with_telemetry(Arc::new(HangingTelemetrySink));
    let history = common::history("h", 2);

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        coordinator.send("conv-1", &history, "hi"),
    )
    .await
    .expect("send blocked on telemetry");
    assert_eq!(outcome.unwrap().response.content, "echo: hi");

    let rejected = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        coordinator.send("conv-1", &history, " "),
    )
    .await
    .expect("failed send blocked on telemetry");
    assert_eq!(rejected.unwrap_err(), DispatchError::EmptyInput);
}

/// **Test: secondary-script input is dispatched with the secondary language tag.**
#[tokio::test]
async fn test_chinese_input_sets_language() {
    let generation = Arc::new(MockGenerationService::default());
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let coordinator = coordinator(generation.clone(), telemetry.clone(), PipelineConfig::default());

    let outcome = coordinator
        .send("conv-1", &[], "我最近很焦虑")
        .await
        .unwrap();

    assert_eq!(outcome.request.language, Language::Chinese);
    assert!(outcome.request.recent_messages.is_empty());
    let events = telemetry.wait_for(1).await;
    assert_eq!(events[0].language, Language::Chinese);
    assert_eq!(events[0].message_length, 6);
}
