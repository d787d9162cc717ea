//! # relay-core
//!
//! Core types and traits for the reply relay: [`Platform`], [`Handler`], inbound message and user types,
//! outgoing messages with attachments, the failure taxonomy, and tracing initialization.
//! Transport-agnostic; the Telegram adapter lives in `relay-bot`.

pub mod error;
pub mod logger;
pub mod platform;
pub mod types;

pub use error::{FailureCause, HandlerError, RelayError, Result};
pub use logger::init_tracing;
pub use platform::Platform;
pub use types::{
    Attachment, Chat, Handler, HandlerResponse, Message, OutgoingMessage, ToCoreMessage,
    ToCoreUser, User,
};
