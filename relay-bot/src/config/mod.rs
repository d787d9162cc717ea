//! Bot configuration: BaseConfig (Telegram + log + DB), StreamConfig, EnvLlmConfig.

mod base;
mod bot_config;


pub use base::{BaseConfig, DEFAULT_DATABASE_URL, DEFAULT_LOG_FILE};
pub use bot_config::BotConfig;
