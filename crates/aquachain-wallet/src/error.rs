use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the session store.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("identity not found: {0}")]
    NotFound(String),
    #[error("persisted session unreadable: {0}")]
    PersistenceRead(String),
    #[error("invalid roster: {0}")]
    InvalidRoster(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
