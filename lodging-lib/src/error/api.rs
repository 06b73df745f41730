//! API error types

use serde_json::Value;

/// An error response from the API.
///
/// `message` is the resolved, user-facing message. For the statuses the
/// client normalizes (400, 403, 404, 408, 500, 503) `body` has already been
/// rewritten so that its message and status fields agree with `message`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP {status}: {message}")]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Resolved error message.
    pub message: String,
    /// Response body (normalized where applicable).
    pub body: Value,
    /// Whether `message` was already shown to the user.
    pub notified: bool,
}

impl ApiError {
    /// Creates a new API error without a body.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: Value::Null,
            notified: false,
        }
    }

    /// Creates a new API error with a response body.
    pub fn with_body(status: u16, message: impl Into<String>, body: Value) -> Self {
        Self {
            status,
            message: message.into(),
            body,
            notified: false,
        }
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        Some(self.status)
    }

    /// Returns the resolved message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` for 5xx statuses.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}
