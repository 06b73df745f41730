//! In-memory credential store

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CredentialStore;
use super::StoredCredentials;
use crate::error::StorageError;

/// A credential store that lives only as long as the process.
///
/// # Example
///
/// ```
/// use lodging_lib::storage::MemoryCredentialStore;
///
/// let store = MemoryCredentialStore::new();
/// ```
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<StoredCredentials>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with credentials.
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            credentials: RwLock::new(credentials),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<StoredCredentials, StorageError> {
        Ok(self.credentials.read().await.clone())
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        *self.credentials.write().await = credentials.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.credentials.write().await = StoredCredentials::default();
        Ok(())
    }
}
