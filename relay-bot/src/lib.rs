//! # relay-bot
//!
//! Telegram application: `/llm` commands and replies to the bot are streamed from an LLM backend into a
//! bounded sequence of Telegram messages; each reply's conversation is stored under its first message id
//! so replying to it continues the conversation.

pub mod chain;
pub mod cli;
pub mod components;
pub mod config;
pub mod exchange;
pub mod handlers;
pub mod runner;
pub mod session;
pub mod telegram;
pub mod trigger;

pub use chain::HandlerChain;
pub use cli::{load_config, Cli, Commands};
pub use components::{
    build_bot_components, build_bot_components_with_store, build_handler_chain, BotComponents,
};
pub use config::{BaseConfig, BotConfig};
pub use exchange::{drive, Exchange, ExchangeOutcome, ExchangeRequest};
pub use handlers::{BotFilterHandler, RelayHandler};
pub use runner::run_bot;
pub use session::{session_key, SessionLoader};
pub use telegram::{run_repl, TelegramMessageWrapper, TelegramPlatform, TelegramUserWrapper};
pub use trigger::{parse_trigger, Trigger, TriggerKind};
