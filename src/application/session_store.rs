// Storage port for the persisted session record
use crate::domain::user::User;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("persisted session is malformed: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to encode session: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Durable home of the single "current user" record.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read the persisted record, `None` when nobody is signed in
    async fn load(&self) -> Result<Option<User>, StorageError>;

    /// Replace the persisted record
    async fn save(&self, user: &User) -> Result<(), StorageError>;

    /// Remove the persisted record; clearing an empty store succeeds
    async fn clear(&self) -> Result<(), StorageError>;
}
