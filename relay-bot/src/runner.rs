use anyhow::Result;
use relay_core::init_tracing;
use tracing::{info, instrument};

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;
use crate::telegram::run_repl;

/// Main entry: validate config, init logging, build components and handler chain, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        database_url = %config.database_url(),
        segment_limit = config.stream.segment_limit,
        "Initializing bot"
    );
    config.llm.log_summary();

    let components = build_bot_components(&config).await?;
    let handler_chain = build_handler_chain(&components);

    info!("Bot started successfully");

    run_repl(
        components.teloxide_bot.clone(),
        handler_chain,
        components.bot_username.clone(),
    )
    .await
}
