//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::Result;
use conversation::{ConversationStore, SqliteConversationStore};
use llm_client::{build_moderator, build_registry};
use relay_core::Platform;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::chain::HandlerChain;
use crate::config::BotConfig;
use crate::exchange::Exchange;
use crate::handlers::{BotFilterHandler, RelayHandler};
use crate::session::SessionLoader;
use crate::telegram::TelegramPlatform;

/// Everything run_bot needs; produced by the component factory.
pub struct BotComponents {
    pub teloxide_bot: Bot,
    pub platform: Arc<dyn Platform>,
    pub store: Arc<dyn ConversationStore>,
    pub exchange: Arc<Exchange>,
    pub bot_username: Arc<RwLock<Option<String>>>,
}

/// Builds the teloxide Bot, pointing it at TELEGRAM_API_URL when set.
fn build_teloxide_bot(config: &BotConfig) -> Bot {
    let bot = Bot::new(config.bot_token());
    match config.telegram_api_url() {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

/// Builds BotComponents with a given conversation store.
#[instrument(skip(config, store))]
pub fn build_bot_components_with_store(
    config: &BotConfig,
    store: Arc<dyn ConversationStore>,
) -> Result<BotComponents> {
    let teloxide_bot = build_teloxide_bot(config);
    let platform: Arc<dyn Platform> = Arc::new(TelegramPlatform::new(teloxide_bot.clone()));

    let registry = build_registry(&config.llm);
    info!(providers = ?registry.tags(), "Provider registry built");

    let exchange = Arc::new(Exchange::new(
        platform.clone(),
        SessionLoader::new(store.clone(), config.llm.system_prompt.clone()),
        registry,
        config.llm.catalog()?,
        build_moderator(&config.llm),
        config.stream.clone(),
    ));

    Ok(BotComponents {
        teloxide_bot,
        platform,
        store,
        exchange,
        bot_username: Arc::new(RwLock::new(None)),
    })
}

/// Opens the SQLite conversation store and builds BotComponents.
#[instrument(skip(config))]
pub async fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let store = SqliteConversationStore::new(config.database_url())
        .await
        .map_err(|e| {
            error!(error = %e, database_url = %config.database_url(), "Failed to initialize conversation storage");
            anyhow::anyhow!("Failed to initialize conversation storage: {}", e)
        })?;
    build_bot_components_with_store(config, Arc::new(store))
}

/// Builds the handler chain (bot filter → relay handler).
pub fn build_handler_chain(components: &BotComponents) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(BotFilterHandler))
        .add_handler(Arc::new(RelayHandler::new(
            components.exchange.clone(),
            components.bot_username.clone(),
        )))
}
