//! Conversation crate: session model and key-value persistence by first reply message id.
//!
//! ## Modules
//!
//! - [`model`] – Conversation, ChatMessage, Role
//! - [`store`] – ConversationStore trait
//! - [`sqlite`] – SqliteConversationStore
//! - [`memory`] – InMemoryConversationStore
//! - [`error`] – StorageError

mod error;
pub mod memory;
pub mod model;
pub mod sqlite;
mod sqlite_pool;
pub mod store;

pub use error::StorageError;
pub use memory::InMemoryConversationStore;
pub use model::{ChatMessage, Conversation, Role};
pub use sqlite::SqliteConversationStore;
pub use sqlite_pool::SqlitePoolManager;
pub use store::ConversationStore;
