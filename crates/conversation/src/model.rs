//! Conversation session model: ordered chat history plus model selection.
//!
//! A [`Conversation`] lives for one exchange. It is loaded (or created fresh), gets exactly one user turn
//! appended, then the backend's own transcript once the stream finishes, and is persisted under the id of
//! the first reply message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author role of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Tool-call result record reported by the backend.
    Tool,
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Author display name (user turns) or tool name (tool records).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, name: Option<String>, datetime: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name,
            datetime: Some(datetime),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            name: None,
            datetime: None,
        }
    }

    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            name: Some(tool_name.into()),
            datetime: None,
        }
    }
}

/// Ordered history for one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Selected model id; `None` means the catalog default.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_instruction: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(model: Option<String>, system_instruction: Option<String>) -> Self {
        Self {
            model,
            system_instruction,
            messages: Vec::new(),
        }
    }

    /// Pushes one user message.
    pub fn append_user_turn(
        &mut self,
        text: impl Into<String>,
        author: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.messages.push(ChatMessage::user(text, author, at));
    }

    /// Appends the backend's transcript for the finished turn verbatim (assistant and tool records).
    pub fn append_transcript(&mut self, transcript: Vec<ChatMessage>) {
        self.messages.extend(transcript);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_user_turn(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }
}
