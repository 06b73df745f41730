//! Durable credential storage.
//!
//! The store is the single shared resource between outgoing requests (which
//! read the access token) and the refresh coordinator, login and logout
//! (which write it). Nothing else should write to it.

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::StorageError;

/// Persisted credential fields.
///
/// Every field is optional: a fresh install has nothing stored, and a refresh
/// response may omit the refresh token or expiry information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Bearer token attached to every request.
    pub access_token: Option<String>,
    /// Token used to obtain a new access token.
    pub refresh_token: Option<String>,
    /// Absolute access token expiry.
    pub access_expires_at: Option<DateTime<Utc>>,
    /// Absolute refresh token expiry.
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

impl StoredCredentials {
    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the expiry state of both tokens at `now`.
    pub fn expiry_state(&self, now: DateTime<Utc>) -> TokenExpiryState {
        TokenExpiryState::from_credentials(self, now)
    }
}

/// Whether the stored tokens have expired.
///
/// A token without a known expiry counts as not expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenExpiryState {
    pub access_expired: bool,
    pub refresh_expired: bool,
}

impl TokenExpiryState {
    /// Computes the expiry state of `credentials` at `now`.
    pub fn from_credentials(credentials: &StoredCredentials, now: DateTime<Utc>) -> Self {
        Self {
            access_expired: credentials.access_expires_at.is_some_and(|t| now > t),
            refresh_expired: credentials.refresh_expires_at.is_some_and(|t| now > t),
        }
    }
}

/// Backend trait for credential storage.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads all stored credential fields.
    async fn load(&self) -> Result<StoredCredentials, StorageError>;

    /// Replaces all stored credential fields.
    async fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError>;

    /// Removes every stored credential field.
    async fn clear(&self) -> Result<(), StorageError>;

    /// Returns the stored access token.
    async fn access_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.access_token)
    }
}
