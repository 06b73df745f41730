//! Error types

mod api;
mod auth;
mod config;
mod network;
mod storage;

use std::sync::Arc;

pub use api::*;
pub use auth::*;
pub use config::*;
pub use network::*;
pub use storage::*;

/// Top-level error returned by [`LodgingClient`](crate::LodgingClient) calls.
///
/// Every variant is returned only after the client has performed its side
/// effects (notification, storage mutation, session signal), so callers can
/// still layer local handling on top.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client is misconfigured. Nothing was sent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No response was received.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The session can no longer be recovered and the user must log in again.
    #[error("Session expired (HTTP {status})")]
    SessionExpired {
        /// Status of the response that ended the session.
        status: u16,
    },

    /// The idle timeout passed. Stored credentials were cleared and nothing
    /// was sent.
    #[error("Session expired due to inactivity")]
    SessionIdle,

    /// Authentication was rejected on the login or refresh endpoint itself.
    #[error("Unauthorized (HTTP {status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Message reported by the server, or a default.
        message: String,
    },

    /// The shared token refresh failed.
    ///
    /// All requests waiting on the same refresh receive the same error.
    #[error("Token refresh failed: {0}")]
    Refresh(Arc<AuthError>),

    /// Error response from the API.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Credential storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A successful response could not be decoded into the requested type.
    #[error("Failed to parse response: {message}")]
    Parse {
        /// Decoder error message.
        message: String,
        /// The undecodable body.
        body: serde_json::Value,
    },
}

impl Error {
    /// Returns the HTTP status code, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::SessionExpired { status } | Self::Unauthorized { status, .. } => Some(*status),
            Self::Api(err) => err.status_code(),
            _ => None,
        }
    }

    /// Returns `true` if this error ended the session.
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired { .. } | Self::SessionIdle | Self::Refresh(_)
        )
    }

    /// Returns the user-facing message attached to this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(err) => err.message.clone(),
            Self::Api(err) => err.message().to_string(),
            Self::Unauthorized { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
