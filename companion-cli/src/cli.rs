//! CLI parser and history file loading.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use companion_core::Message;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "companion")]
#[command(about = "Conversation context CLI: classify, select, send", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify text: language, topics, safety flag and estimated tokens.
    Classify { text: String },
    /// Select the context bundle for a history file (JSON array of messages).
    Select {
        #[arg(long)]
        history: PathBuf,
        /// Overrides CONTEXT_MAX_TOKENS.
        #[arg(long)]
        max_tokens: Option<usize>,
    },
    /// Send text with a history file as the conversation; generation endpoint from env.
    Send {
        #[arg(long)]
        history: PathBuf,
        #[arg(long)]
        text: String,
        #[arg(long, default_value = "cli")]
        conversation_id: String,
        #[arg(long)]
        max_tokens: Option<usize>,
    },
}

/// Reads a JSON array of messages (camelCase fields, RFC 3339 timestamps).
pub fn load_history(path: &Path) -> Result<Vec<Message>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    let messages: Vec<Message> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid history JSON in {}", path.display()))?;
    Ok(messages)
}
