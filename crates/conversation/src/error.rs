//! Storage error types.

use relay_core::RelayError;
use thiserror::Error;

/// Errors from conversation stores.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<StorageError> for RelayError {
    fn from(err: StorageError) -> Self {
        RelayError::Storage(err.to_string())
    }
}
