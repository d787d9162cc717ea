use async_trait::async_trait;

use crate::error::StorageError;
use crate::model::Conversation;

/// Key-value persistence for conversations, keyed by the platform id of the first reply message.
/// Single-key get/put with no locking; concurrent replies to the same conversation may lose an update.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Conversation>, StorageError>;
    async fn put(&self, key: &str, conversation: &Conversation) -> Result<(), StorageError>;
}
