//! Inbound message type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{chat::Chat, user::User};

/// A single inbound message with user, chat, content, and optional reply context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub reply_to_message_id: Option<String>,
    /// Whether the replied-to message was sent by a bot; only meaningful when `reply_to_message_id` is set.
    pub reply_to_message_from_bot: bool,
}
