//! In-memory [`ConversationStore`] for tests and ephemeral runs. Data is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::model::Conversation;
use crate::store::ConversationStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    entries: Arc<RwLock<HashMap<String, Conversation>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, key: &str) -> Result<Option<Conversation>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, conversation: &Conversation) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), conversation.clone());
        Ok(())
    }
}
