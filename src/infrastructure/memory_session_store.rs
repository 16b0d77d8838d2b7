// In-memory session storage, for tests and `session.storage = "memory"`
use crate::application::session_store::{SessionStorage, StorageError};
use crate::domain::user::User;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    record: RwLock<Option<User>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> Result<Option<User>, StorageError> {
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, user: &User) -> Result<(), StorageError> {
        *self.record.write().await = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.record.write().await = None;
        Ok(())
    }
}
