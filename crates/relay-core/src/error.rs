//! Error types for the relay.
//!
//! [`RelayError`] is the top-level error; invocation-level variants carry a user-facing text via
//! [`RelayError::user_message`]. [`FailureCause`] is the part-level taxonomy rendered inline in a reply.
//! [`HandlerError`] is used for trigger/handler failures.

use thiserror::Error;

/// A failure reported while a reply is streaming. Rendered inline as a `Failure` part; the stream may continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// Malformed tool or model input (schema/type validation).
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The backend or platform API call failed.
    #[error("upstream call failed: {message}")]
    UpstreamCall { message: String },

    /// The backend gave up after its internal retries.
    #[error("gave up after {attempts} attempts: {message}")]
    RetryExhausted { attempts: u32, message: String },

    /// A named tool failed while executing.
    #[error("tool {tool} failed: {message}")]
    ToolExecution { tool: String, message: String },

    /// Anything uncategorized.
    #[error("{0}")]
    Other(String),
}

impl FailureCause {
    /// Stable category name, used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            FailureCause::Validation { .. } => "validation",
            FailureCause::UpstreamCall { .. } => "upstream_call",
            FailureCause::RetryExhausted { .. } => "retry_exhausted",
            FailureCause::ToolExecution { .. } => "tool_execution",
            FailureCause::Other(_) => "other",
        }
    }
}

/// Top-level error for the relay (platform transport, storage, backend, routing, moderation, config, IO).
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Backend error: {0}")]
    Backend(#[from] FailureCause),

    #[error("Blocked by moderation")]
    ModerationBlocked,

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// The single message shown to the user when this error aborts a whole exchange.
    /// Never contains the raw internal cause.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::ModerationBlocked => {
                "🚫 This request was blocked by content moderation.".to_string()
            }
            RelayError::UnsupportedProvider(tag) => format!("⚠️ Unsupported provider: {}", tag),
            RelayError::UnknownModel(id) => format!("⚠️ Unknown model: {}", id),
            RelayError::Handler(HandlerError::EmptyPrompt) => {
                "Usage: /llm [model:<id>] <prompt>".to_string()
            }
            _ => "⚠️ Something went wrong while processing your request. Please try again later."
                .to_string(),
        }
    }
}

/// Errors produced by handlers and trigger parsing.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No text in message")]
    NoText,

    #[error("Empty prompt")]
    EmptyPrompt,

    #[error("State error: {0}")]
    State(String),
}

/// Result type for relay operations; uses [`RelayError`].
pub type Result<T> = std::result::Result<T, RelayError>;
