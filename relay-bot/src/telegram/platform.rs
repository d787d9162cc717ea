//! [`Platform`] over teloxide: messages, edits, documents and the typing action.
//!
//! Telegram cannot attach files to a text message after the fact, so attachments are sent as documents
//! replying to the message that carries them. The caller passes each file once per message.

use async_trait::async_trait;
use relay_core::{Attachment, Chat, OutgoingMessage, Platform, RelayError, Result};
use std::future::Future;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::requests::Request;
use teloxide::types::{ChatAction, ChatId, InputFile, MessageId, ReplyParameters};
use teloxide::{ApiError, RequestError};
use tracing::{debug, instrument, warn};

const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Sent instead of a segment with no visible characters; Telegram rejects blank text.
pub const BLANK_SEGMENT_PLACEHOLDER: &str = "…";

/// Parses a platform message id into a Telegram message id.
pub fn parse_message_id(s: &str) -> Result<MessageId> {
    s.parse()
        .map(MessageId)
        .map_err(|_| RelayError::Platform(format!("Invalid message_id: {}", s)))
}

/// Text Telegram will accept: whitespace-only content becomes [`BLANK_SEGMENT_PLACEHOLDER`].
pub fn visible_text(content: &str) -> &str {
    if content.trim().is_empty() {
        BLANK_SEGMENT_PLACEHOLDER
    } else {
        content
    }
}

/// True when an edit left the content unchanged; treated as success.
pub fn is_message_not_modified(error: &RequestError) -> bool {
    matches!(error, RequestError::Api(ApiError::MessageNotModified))
}

/// Wait requested by a Telegram rate-limit reply.
fn retry_after(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(secs) => Some(secs.duration()),
        _ => None,
    }
}

/// Runs a Telegram request, waiting out rate limits a bounded number of times.
async fn with_rate_limit_retry<T, F, Fut>(mut call: F) -> std::result::Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RequestError>>,
{
    let mut retries = 0;
    loop {
        match call().await {
            Err(e) if retries < MAX_RATE_LIMIT_RETRIES => {
                let Some(wait) = retry_after(&e) else {
                    return Err(e);
                };
                retries += 1;
                warn!(retry_after_secs = wait.as_secs(), retries, "Rate limited by Telegram, retrying");
                tokio::time::sleep(wait).await;
            }
            other => return other,
        }
    }
}

fn platform_error(e: RequestError) -> RelayError {
    RelayError::Platform(e.to_string())
}

pub struct TelegramPlatform {
    bot: teloxide::Bot,
}

impl TelegramPlatform {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }

    async fn send_text(&self, chat: &Chat, reply_to: Option<&str>, text: &str) -> Result<String> {
        let reply_to = reply_to.map(parse_message_id).transpose()?;
        let text = visible_text(text);
        let sent = with_rate_limit_retry(|| {
            let request = self.bot.send_message(ChatId(chat.id), text.to_string());
            match reply_to {
                Some(id) => request.reply_parameters(ReplyParameters::new(id)),
                None => request,
            }
            .send()
        })
        .await
        .map_err(platform_error)?;
        Ok(sent.id.to_string())
    }

    /// Sends attachments as documents replying to `message_id`.
    async fn upload(&self, chat: &Chat, message_id: &str, attachments: Vec<Attachment>) -> Result<()> {
        if attachments.is_empty() {
            return Ok(());
        }
        let anchor = parse_message_id(message_id)?;

        for attachment in attachments {
            debug!(filename = %attachment.filename, message_id, "Uploading attachment");
            with_rate_limit_retry(|| {
                let file = InputFile::memory(attachment.content.clone())
                    .file_name(attachment.filename.clone());
                self.bot
                    .send_document(ChatId(chat.id), file)
                    .caption(attachment.description.clone())
                    .reply_parameters(ReplyParameters::new(anchor))
                    .send()
            })
            .await
            .map_err(platform_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Platform for TelegramPlatform {
    #[instrument(skip(self, chat, message), fields(chat_id = chat.id))]
    async fn send_initial(
        &self,
        chat: &Chat,
        in_reply_to: Option<&str>,
        message: OutgoingMessage,
    ) -> Result<String> {
        let id = self.send_text(chat, in_reply_to, &message.content).await?;
        self.upload(chat, &id, message.attachments).await?;
        Ok(id)
    }

    #[instrument(skip(self, chat, message), fields(chat_id = chat.id))]
    async fn reply(
        &self,
        chat: &Chat,
        previous_id: &str,
        message: OutgoingMessage,
    ) -> Result<String> {
        let id = self.send_text(chat, Some(previous_id), &message.content).await?;
        self.upload(chat, &id, message.attachments).await?;
        Ok(id)
    }

    #[instrument(skip(self, chat, message), fields(chat_id = chat.id))]
    async fn edit(&self, chat: &Chat, message_id: &str, message: OutgoingMessage) -> Result<()> {
        let id = parse_message_id(message_id)?;
        let text = visible_text(&message.content);
        let edited = with_rate_limit_retry(|| {
            self.bot
                .edit_message_text(ChatId(chat.id), id, text.to_string())
                .send()
        })
        .await;
        match edited {
            Ok(_) => {}
            Err(e) if is_message_not_modified(&e) => {
                debug!(message_id, "Message not modified");
            }
            Err(e) => return Err(platform_error(e)),
        }
        self.upload(chat, message_id, message.attachments).await
    }

    async fn send_typing(&self, chat: &Chat) -> Result<()> {
        self.bot
            .send_chat_action(ChatId(chat.id), ChatAction::Typing)
            .await
            .map_err(platform_error)?;
        Ok(())
    }
}
