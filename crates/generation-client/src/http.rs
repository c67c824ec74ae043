//! `GenerationService` over HTTP: one JSON POST per send.

use anyhow::Result;
use async_trait::async_trait;
use companion_core::truncate_for_log;
use reqwest::Client;
use tracing::{info, instrument};

use crate::config::GenerationConfig;
use crate::types::{GenerationRequest, GenerationResponse};
use crate::GenerationService;

/// Posts [`GenerationRequest`]s to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpGenerationService {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpGenerationService {
    /// Builds a client with the configured timeout.
    pub fn from_config(config: &dyn GenerationConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            api_url: config.api_url().to_string(),
            api_key: config.api_key().map(str::to_string),
        })
    }

    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    #[instrument(skip(self, request), fields(conversation_id = %request.conversation_id))]
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        info!(
            url = %self.api_url,
            content_preview = %truncate_for_log(&request.content, 80),
            recent_messages = request.recent_messages.len(),
            language = %request.language,
            "Generation request"
        );

        let mut builder = self.client.post(&self.api_url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Generation API error ({}): {}",
                status,
                truncate_for_log(&error_text, 200)
            ));
        }

        let body = response.text().await?;
        let reply: GenerationResponse = if body.trim().is_empty() {
            GenerationResponse::default()
        } else {
            serde_json::from_str(&body)?
        };
        info!(
            reply_len = reply.content.chars().count(),
            message_id = ?reply.message_id,
            "Generation response"
        );
        Ok(reply)
    }
}
