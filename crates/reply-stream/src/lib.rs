//! # reply-stream
//!
//! Turns an incrementally produced reply (prompt, text fragments, tool markers, failures) into a bounded
//! sequence of platform messages under a per-message size limit.
//!
//! ## Modules
//!
//! - [`part`] – `Part` and the append-only `PartLog`
//! - [`render`] – part log → display text + attachments
//! - [`code_blocks`] – long fenced code blocks → file attachments
//! - [`chunk`] – display text → fixed-width segments
//! - [`synchronizer`] – edit-vs-create reconciliation against emitted messages
//! - [`heartbeat`] – typing indicator timer
//! - [`config`] – `StreamConfig`

pub mod chunk;
pub mod code_blocks;
pub mod config;
pub mod heartbeat;
pub mod part;
pub mod render;
pub mod synchronizer;

pub use chunk::split_segments;
pub use config::StreamConfig;
pub use heartbeat::TypingHeartbeat;
pub use part::{Part, PartLog};
pub use render::{describe_failure, snip, tool_label, Rendered, Renderer};
pub use synchronizer::{MessageSink, PassReport, PlatformSink, ReplySynchronizer, SyncState};
