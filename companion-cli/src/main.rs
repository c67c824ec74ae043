//! companion CLI: classify text, select a context bundle, or run a full send.

use anyhow::{Context, Result};
use clap::Parser;
use classifier::Classifier;
use companion_cli::{load_history, Cli, Commands};
use companion_core::init_tracing;
use context::ContextSelector;
use generation_client::{EnvGenerationConfig, HttpGenerationService};
use send_pipeline::{ChatSession, PipelineConfig, SendCoordinator};
use serde::Serialize;
use std::sync::Arc;
use sync_buffer::InMemoryHistorySource;
use tracing::info;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyOutput<'a> {
    #[serde(flatten)]
    classification: &'a classifier::Classification,
    estimated_tokens: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&PipelineConfig::log_file_from_env())?;
    let mut config = PipelineConfig::from_env();

    match cli.command {
        Commands::Classify { text } => {
            let classifier = Classifier::new(config.default_language);
            let classification = classifier.classify(&text);
            let output = ClassifyOutput {
                classification: &classification,
                estimated_tokens: context::estimate_tokens(&text),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Select {
            history,
            max_tokens,
        } => {
            if let Some(max_tokens) = max_tokens {
                config.selection.max_tokens = max_tokens;
            }
            let messages = load_history(&history)?;
            let selector = ContextSelector::new(Classifier::new(config.default_language));
            let bundle = selector.optimize(&messages, &config.selection);
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
        Commands::Send {
            history,
            text,
            conversation_id,
            max_tokens,
        } => {
            if let Some(max_tokens) = max_tokens {
                config.selection.max_tokens = max_tokens;
            }
            let messages = load_history(&history)?;
            let generation_config = EnvGenerationConfig::from_env()
                .context("Load generation config from .env (GENERATION_API_URL)")?;
            let generation = HttpGenerationService::from_config(&generation_config)?;

            let source = InMemoryHistorySource::new(messages.len().max(1));
            source.extend(&conversation_id, messages).await;
            let coordinator = Arc::new(SendCoordinator::new(Arc::new(generation), config));
            let session = ChatSession::new(Arc::new(source), coordinator);
            let loaded = session.switch_conversation(&conversation_id).await?;
            info!(conversation_id = %conversation_id, loaded, "History loaded");

            let outcome = session.send(&text).await?;
            println!("{}", outcome.response.content);
        }
    }
    Ok(())
}
