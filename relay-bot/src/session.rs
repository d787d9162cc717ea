//! Opens the conversation for one exchange: continue a stored one or start fresh.

use chrono::Utc;
use conversation::{Conversation, ConversationStore};
use llm_client::system_instruction;
use relay_core::{Chat, Result};
use std::sync::Arc;
use tracing::info;

/// Store key for the conversation whose first reply is `message_id` in `chat`.
///
/// Telegram message ids are only unique within a chat, so the chat id is part of the key.
pub fn session_key(chat: &Chat, message_id: &str) -> String {
    format!("{}:{}", chat.id, message_id)
}

#[derive(Clone)]
pub struct SessionLoader {
    store: Arc<dyn ConversationStore>,
    system_prompt: Option<String>,
}

impl SessionLoader {
    pub fn new(store: Arc<dyn ConversationStore>, system_prompt: Option<String>) -> Self {
        Self {
            store,
            system_prompt,
        }
    }

    /// Loads the conversation stored for reply `resume_from` in `chat`, or creates a fresh one (with a
    /// system instruction stamped with the current time) when there is none. An explicitly requested
    /// model replaces the stored selection.
    pub async fn open(
        &self,
        chat: &Chat,
        resume_from: Option<&str>,
        requested_model: Option<&str>,
    ) -> Result<Conversation> {
        let key = resume_from.map(|id| session_key(chat, id));
        let stored = match key.as_deref() {
            Some(key) => self.store.get(key).await?,
            None => None,
        };

        let mut conversation = match stored {
            Some(conversation) => {
                info!(key = ?key, messages = conversation.len(), "Continuing stored conversation");
                conversation
            }
            None => {
                if key.is_some() {
                    info!(key = ?key, "No stored conversation, starting fresh");
                }
                Conversation::new(
                    None,
                    Some(system_instruction(self.system_prompt.as_deref(), Utc::now())),
                )
            }
        };

        if let Some(model) = requested_model {
            conversation.model = Some(model.to_string());
        }
        Ok(conversation)
    }

    /// Stores `conversation` under the first reply message of the exchange.
    pub async fn save(&self, chat: &Chat, message_id: &str, conversation: &Conversation) -> Result<()> {
        self.store.put(&session_key(chat, message_id), conversation).await?;
        Ok(())
    }
}
