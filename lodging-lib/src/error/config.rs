//! Configuration error types

/// Errors raised while loading or applying client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No base URL was configured for the API.
    #[error(
        "API Base URL is not configured. Please set the LODGING_API_BASE_URL environment variable to the correct URL for your environment and restart the application."
    )]
    MissingBaseUrl,

    /// A configuration value could not be parsed.
    #[error("Invalid value for {key}: {message}")]
    Invalid {
        /// The offending setting.
        key: String,
        /// Why it was rejected.
        message: String,
    },
}

impl ConfigError {
    /// Creates a new invalid-value error.
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}
