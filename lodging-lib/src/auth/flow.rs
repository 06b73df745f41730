//! Low-level refresh call.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::TokenGrant;
use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::transport::ApiRequest;
use crate::transport::Transport;

/// Exchanges a refresh token for a new grant.
///
/// Implementations must not route through [`LodgingClient`](crate::LodgingClient)
/// itself, otherwise a failing refresh would re-enter the refresh logic.
#[async_trait]
pub trait RefreshFlow: Send + Sync {
    /// Refreshes using the given refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError>;
}

/// [`RefreshFlow`] that POSTs `{ "refreshToken": .. }` to the refresh endpoint
/// directly through the transport.
pub struct HttpRefreshFlow {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl HttpRefreshFlow {
    /// Creates a flow targeting `config.refresh_path`.
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }
}

#[async_trait]
impl RefreshFlow for HttpRefreshFlow {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let url = self.config.resolve(&self.config.refresh_path)?;
        let request = ApiRequest::post(url)
            .header("Content-Type", "application/json")
            .json(json!({ "refreshToken": refresh_token }));

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(AuthError::RefreshRejected {
                status: response.status,
            });
        }

        TokenGrant::from_refresh_response(&response.body)
    }
}
