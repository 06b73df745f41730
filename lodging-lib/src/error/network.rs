//! Network failure types

use std::error::Error as StdError;
use std::fmt;

/// Why a request received no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkFailure {
    /// The service is down or unreachable.
    Unreachable,
    /// The service is reachable but the response was withheld by a CORS policy.
    Cors {
        /// The origin that was blocked.
        origin: String,
    },
    /// The TLS handshake failed because of a certificate problem.
    Tls,
}

impl NetworkFailure {
    /// Returns the message shown to the user for this failure.
    pub fn message(&self) -> String {
        match self {
            Self::Unreachable => "API Service is not running or unable to connect.".to_string(),
            Self::Cors { origin } => format!(
                "The Request Was Blocked Due To CORS policy. Ensure The API Allows This '{}' Origin.",
                origin
            ),
            Self::Tls => {
                "SSL Certificate error. Please check if the API's HTTPS certificate is valid."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for NetworkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "unreachable"),
            Self::Cors { .. } => write!(f, "cors"),
            Self::Tls => write!(f, "tls"),
        }
    }
}

/// A request that received no response, with its classification.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct NetworkError {
    /// Classification from the reachability probe.
    pub failure: NetworkFailure,
    /// Human-readable message, already shown to the user.
    pub message: String,
    /// The URL that failed.
    pub url: String,
    /// Message of the underlying transport error.
    pub source_message: String,
}

impl NetworkError {
    /// Creates a network error using the failure's default message.
    pub fn new(failure: NetworkFailure, url: impl Into<String>, source_message: impl Into<String>) -> Self {
        Self {
            message: failure.message(),
            failure,
            url: url.into(),
            source_message: source_message.into(),
        }
    }

    /// Returns `true` if the failure was classified as a CORS block.
    pub fn is_cors(&self) -> bool {
        matches!(self.failure, NetworkFailure::Cors { .. })
    }

    /// Returns `true` if the failure was classified as a certificate problem.
    pub fn is_tls(&self) -> bool {
        matches!(self.failure, NetworkFailure::Tls)
    }
}

/// Error produced by a [`Transport`](crate::transport::Transport) when no
/// response was received.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    /// Message of the underlying failure.
    pub message: String,
    /// Whether the request timed out.
    pub timed_out: bool,
}

impl TransportError {
    /// Creates a new transport error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Creates a transport error for a request that timed out.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Returns `true` if the message points at a certificate problem.
    pub fn is_certificate_error(&self) -> bool {
        let message = &self.message;
        message.contains("SSL") || message.contains("certificate") || message.contains("ERR_CERT")
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest keeps the TLS detail in the source chain
        let mut message = err.to_string();
        let mut source = StdError::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        Self {
            message,
            timed_out: err.is_timeout(),
        }
    }
}
