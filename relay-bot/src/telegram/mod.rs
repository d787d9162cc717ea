//! Telegram layer: adapters, [`relay_core::Platform`] implementation, REPL runner.

mod adapters;
mod platform;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use platform::{is_message_not_modified, parse_message_id, visible_text, TelegramPlatform};
pub use runner::run_repl;
