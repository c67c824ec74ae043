//! Wire types for the generation service. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use companion_core::{Language, Message, MessageRole};
use serde::{Deserialize, Serialize};

/// One prior turn as forwarded to the service. Only role, content and timestamp cross the
/// boundary; ids and annotations stay local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for RecentMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.text.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// Optional profile hints passed through to the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<Language>,
}

/// A single generation call: the new input plus the selected context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub conversation_id: String,
    pub user_id: String,
    pub content: String,
    pub language: Language,
    pub chat_mode: String,
    pub recent_messages: Vec<RecentMessage>,
    pub user_info: Option<UserInfo>,
}

/// What the service returns on success.
///
/// The reply is delivered to the conversation by the backend itself; callers only use this
/// for logging and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}
