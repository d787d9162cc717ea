//! Turns triggering messages into exchanges and reports invocation-level failures to the chat.

use async_trait::async_trait;
use relay_core::{
    Handler, HandlerError, HandlerResponse, Message, OutgoingMessage, RelayError, Result,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::exchange::{Exchange, ExchangeRequest};
use crate::trigger::parse_trigger;

/// Terminal handler: `/llm` commands and replies to the bot start an exchange; everything else continues.
pub struct RelayHandler {
    exchange: Arc<Exchange>,
    bot_username: Arc<RwLock<Option<String>>>,
}

impl RelayHandler {
    pub fn new(exchange: Arc<Exchange>, bot_username: Arc<RwLock<Option<String>>>) -> Self {
        Self {
            exchange,
            bot_username,
        }
    }

    /// Sends one error message answering the trigger. A failed send is only logged.
    async fn report(&self, message: &Message, err: &RelayError) {
        let notice = OutgoingMessage::text(err.user_message());
        if let Err(send_err) = self
            .exchange
            .platform()
            .send_initial(&message.chat, Some(&message.id), notice)
            .await
        {
            error!(error = %send_err, chat_id = message.chat.id, "Failed to send error message");
        }
    }
}

#[async_trait]
impl Handler for RelayHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let bot_username = self.bot_username.read().await.clone();
        let trigger = match parse_trigger(message, bot_username.as_deref()) {
            Ok(Some(trigger)) => trigger,
            Ok(None) => return Ok(HandlerResponse::Continue),
            Err(HandlerError::EmptyPrompt) => {
                self.report(message, &RelayError::Handler(HandlerError::EmptyPrompt))
                    .await;
                return Ok(HandlerResponse::Stop);
            }
            Err(e) => return Err(e.into()),
        };

        info!(kind = ?trigger.kind, model = ?trigger.model, "Trigger detected");

        let request = ExchangeRequest {
            chat: message.chat.clone(),
            trigger_message_id: message.id.clone(),
            author: Some(message.user.display_name()),
            model: trigger.model.clone(),
            resume_from: trigger.resume_from().map(str::to_string),
            at: message.created_at,
            prompt: trigger.prompt,
        };

        match self.exchange.run(request).await {
            Ok(outcome) => match outcome.first_message_id {
                Some(id) => Ok(HandlerResponse::Reply(id)),
                None => {
                    warn!("Exchange produced no message");
                    Ok(HandlerResponse::Stop)
                }
            },
            Err(err) => {
                error!(error = %err, "Exchange failed");
                self.report(message, &err).await;
                Ok(HandlerResponse::Stop)
            }
        }
    }
}
