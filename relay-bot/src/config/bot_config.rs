//! Full bot config: base (Telegram, log, DB) + stream settings + LLM settings.

use anyhow::Result;
use llm_client::EnvLlmConfig;
use reply_stream::StreamConfig;

use super::base::BaseConfig;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base: BaseConfig,
    pub stream: StreamConfig,
    pub llm: EnvLlmConfig,
}

impl BotConfig {
    /// Load every section from the environment. `token` overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        Ok(Self {
            base: BaseConfig::load(token)?,
            stream: StreamConfig::from_env()?,
            llm: EnvLlmConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.stream.validate()?;
        self.llm.validate()?;
        Ok(())
    }

    pub fn bot_token(&self) -> &str {
        &self.base.bot_token
    }

    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }

    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }

    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
}
