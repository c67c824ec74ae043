//! # Generation client
//!
//! Defines the [`GenerationService`] trait the send pipeline dispatches through, its wire
//! types, and an HTTP implementation. Retry policy belongs to implementations; callers only
//! see success or an error.

use anyhow::Result;
use async_trait::async_trait;

pub mod config;
mod http;
mod types;


pub use config::{EnvGenerationConfig, GenerationConfig, DEFAULT_TIMEOUT_SECS};
pub use http::HttpGenerationService;
pub use types::{GenerationRequest, GenerationResponse, RecentMessage, UserInfo};

/// External language-generation service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Sends one request; returns the service's reply or an error.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;
}
