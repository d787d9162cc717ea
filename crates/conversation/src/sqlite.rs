//! SQLite-backed [`ConversationStore`]: one row per conversation, JSON body, keyed by message id.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::model::Conversation;
use crate::sqlite_pool::SqlitePoolManager;
use crate::store::ConversationStore;

#[derive(Clone)]
pub struct SqliteConversationStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteConversationStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating conversations table if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                message_id TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    /// Number of stored conversations.
    pub async fn count(&self) -> Result<i64, StorageError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(row.0)
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn get(&self, key: &str) -> Result<Option<Conversation>, StorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM conversations WHERE message_id = ?")
                .bind(key)
                .fetch_optional(self.pool_manager.pool())
                .await?;

        match row {
            Some((body,)) => {
                let conversation: Conversation = serde_json::from_str(&body)?;
                debug!(key = %key, messages = conversation.len(), "Loaded conversation");
                Ok(Some(conversation))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, conversation: &Conversation) -> Result<(), StorageError> {
        let body = serde_json::to_string(conversation)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO conversations (message_id, body, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(key)
        .bind(&body)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;

        info!(key = %key, messages = conversation.len(), "Saved conversation");
        Ok(())
    }
}
