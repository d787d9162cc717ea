//! REPL runner: converts teloxide messages to core messages and passes them to the HandlerChain.

use anyhow::Result;
use relay_core::ToCoreMessage;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use super::adapters::TelegramMessageWrapper;
use crate::chain::HandlerChain;

/// Starts the REPL. Calls get_me() first to learn the bot username (used for `/llm@<bot>`) and user id
/// (used to recognise replies to this bot); each message is handled in its own task so one slow exchange
/// never blocks the others.
#[instrument(skip(bot, handler_chain, bot_username))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    bot_username: Arc<RwLock<Option<String>>>,
) -> Result<()> {
    let bot_id = match bot.get_me().await {
        Ok(me) => {
            if let Some(username) = &me.user.username {
                *bot_username.write().await = Some(username.clone());
                info!(username = %username, bot_id = me.user.id.0, "Bot identity set before repl");
            }
            Some(me.user.id)
        }
        Err(e) => {
            warn!(error = %e, "get_me failed; addressed commands will not be filtered");
            None
        }
    };

    teloxide::repl(bot, move |msg: teloxide::types::Message| {
        let chain = handler_chain.clone();

        async move {
            if msg.text().is_none() {
                return Ok(());
            }
            let core_msg = TelegramMessageWrapper(&msg, bot_id).to_core();

            tokio::spawn(async move {
                info!(
                    user_id = core_msg.user.id,
                    chat_id = core_msg.chat.id,
                    message_id = %core_msg.id,
                    "Handler chain started"
                );
                if let Err(e) = chain.handle(&core_msg).await {
                    error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
