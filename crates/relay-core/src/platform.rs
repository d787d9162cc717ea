//! Platform abstraction for sending, replying to, and editing chat messages.
//!
//! [`Platform`] is transport-agnostic; `relay-bot` implements it for Telegram via teloxide.
//! Message ids are transport-specific strings (e.g. Telegram numeric ids).

use crate::error::Result;
use crate::types::{Chat, OutgoingMessage};
use async_trait::async_trait;

/// Chat platform collaborator. Retries, if any, belong to implementations.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Sends the first message of a reply, optionally as a reply to `in_reply_to` (the triggering message).
    /// Returns the new message id.
    async fn send_initial(
        &self,
        chat: &Chat,
        in_reply_to: Option<&str>,
        message: OutgoingMessage,
    ) -> Result<String>;

    /// Sends a follow-up message addressed to `previous_id`. Returns the new message id.
    async fn reply(&self, chat: &Chat, previous_id: &str, message: OutgoingMessage)
        -> Result<String>;

    /// Replaces the content of an already-sent message. `message.attachments` holds only files the
    /// message has not received yet.
    async fn edit(&self, chat: &Chat, message_id: &str, message: OutgoingMessage) -> Result<()>;

    /// Shows the "composing" indicator in the chat.
    async fn send_typing(&self, chat: &Chat) -> Result<()>;
}
