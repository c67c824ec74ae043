//! Generation service configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Generation service configuration interface.
pub trait GenerationConfig: Send + Sync {
    fn api_url(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn timeout(&self) -> Duration;
}

/// Generation config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvGenerationConfig {
    pub generation_api_url: String,
    pub generation_api_key: Option<String>,
    pub generation_timeout_secs: u64,
}

impl GenerationConfig for EnvGenerationConfig {
    fn api_url(&self) -> &str {
        &self.generation_api_url
    }
    fn api_key(&self) -> Option<&str> {
        self.generation_api_key.as_deref()
    }
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

impl EnvGenerationConfig {
    /// Load from environment variables. `GENERATION_API_URL` is required.
    pub fn from_env() -> Result<Self> {
        let generation_api_url =
            env::var("GENERATION_API_URL").context("GENERATION_API_URL not set")?;
        let generation_api_key = env::var("GENERATION_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let generation_timeout_secs = match env::var("GENERATION_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid GENERATION_TIMEOUT_SECS, using default");
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            generation_api_url,
            generation_api_key,
            generation_timeout_secs,
        })
    }
}
