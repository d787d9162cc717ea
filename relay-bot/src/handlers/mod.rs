//! Handlers run by the [`crate::chain::HandlerChain`].

mod bot_filter;
mod relay_handler;

pub use bot_filter::BotFilterHandler;
pub use relay_handler::RelayHandler;
