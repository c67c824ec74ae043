//! # Send pipeline
//!
//! Top of the conversation context subsystem:
//!
//! - [`SendCoordinator`] classifies the input, packs a context bundle from the buffered history,
//!   dispatches to a [`generation_client::GenerationService`] and emits [`SendTelemetry`].
//! - [`ChatSession`] is what a display layer binds to: ordered messages, pagination flags,
//!   `load_older`, `send`, `switch_conversation` and `reset`, plus draft and typing state.
//! - [`PipelineConfig`] loads selection and dispatch settings from the environment.

pub mod config;
pub mod coordinator;
pub mod session;
pub mod telemetry;


pub use config::PipelineConfig;
pub use coordinator::{SendCoordinator, SendOutcome};
pub use session::ChatSession;
pub use telemetry::{
    emit, spawn_emit, PhaseDurations, SendTelemetry, TelemetrySink, TracingTelemetrySink,
};
