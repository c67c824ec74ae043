use thiserror::Error;

/// Failures of the conversation sync layer. All variants leave buffer state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Pagination fetch failed; retry is safe.
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("No conversation is active")]
    NotInitialized,

    /// A response arrived for a conversation epoch that is no longer active.
    #[error("Stale response: expected epoch {expected_epoch}, got {actual_epoch}")]
    StaleResponse { expected_epoch: u64, actual_epoch: u64 },
}

/// Failures of a send. The user's typed input is preserved whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Empty content")]
    EmptyInput,

    #[error("No conversation is active")]
    NoActiveConversation,

    #[error("Generation error: {0}")]
    Generation(String),
}

impl DispatchError {
    /// Short class name recorded as `errorClass` in send telemetry.
    pub fn error_class(&self) -> &'static str {
        match self {
            DispatchError::EmptyInput => "empty_input",
            DispatchError::NoActiveConversation => "no_active_conversation",
            DispatchError::Generation(_) => "generation",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown language tag: {0}")]
pub struct UnknownLanguage(pub String);
