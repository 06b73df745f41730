//! Credential storage error types

/// Errors raised by a [`CredentialStore`](crate::storage::CredentialStore).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),

    /// A stored value could not be decoded.
    #[error("corrupt stored value for {key}: {message}")]
    Corrupt {
        /// Storage key of the value.
        key: &'static str,
        /// Decoder message.
        message: String,
    },
}
