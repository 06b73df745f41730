//! Authentication error types

/// Errors that can occur while obtaining or refreshing tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No refresh token is stored.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The refresh endpoint answered with a non-success status.
    #[error("Failed to refresh token (HTTP {status})")]
    RefreshRejected {
        /// HTTP status code.
        status: u16,
    },

    /// The token response did not contain an access token.
    #[error("No access token in refresh response")]
    MissingAccessToken,

    /// The refresh endpoint could not be reached.
    #[error("Network error during auth: {0}")]
    Network(#[from] crate::error::TransportError),

    /// The refresh was abandoned before it completed.
    #[error("Token refresh was aborted")]
    RefreshAborted,

    /// Failed to parse the token response.
    #[error("Auth response parse error: {0}")]
    Parse(String),

    /// The refresh endpoint could not be resolved.
    #[error(transparent)]
    Config(#[from] crate::error::ConfigError),

    /// Refreshed tokens could not be persisted.
    #[error("Failed to persist tokens: {0}")]
    Storage(String),
}
