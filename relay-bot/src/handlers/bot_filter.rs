//! Drops messages from other bots and logs what is processed.

use async_trait::async_trait;
use relay_core::{Handler, HandlerResponse, Message, Result};
use tracing::{debug, info, instrument};

/// Stops the chain for messages sent by bots; logs everything else in before() and the response in after().
pub struct BotFilterHandler;

#[async_trait]
impl Handler for BotFilterHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        if message.user.is_bot {
            debug!(user_id = message.user.id, "Ignoring message from a bot");
            return Ok(false);
        }
        info!(
            user_id = message.user.id,
            username = %message.user.username.as_deref().unwrap_or("unknown"),
            message_content = %message.content,
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        debug!(message_id = %message.id, response = ?response, "Processed message");
        Ok(())
    }
}
