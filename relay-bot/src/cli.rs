//! CLI parser and config loading.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::BotConfig;

#[derive(Parser)]
#[command(name = "relay-bot")]
#[command(about = "Telegram bot relaying /llm prompts to LLM backends", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Load BotConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_token() {
        let cli = Cli::parse_from(["relay-bot", "run", "--token", "abc"]);
        match cli.command {
            Commands::Run { token } => assert_eq!(token.as_deref(), Some("abc")),
        }
    }

    #[test]
    fn test_parse_run_without_token() {
        let cli = Cli::parse_from(["relay-bot", "run"]);
        match cli.command {
            Commands::Run { token } => assert!(token.is_none()),
        }
    }
}
