//! Main LodgingClient

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::auth::HttpRefreshFlow;
use crate::auth::LoginRequest;
use crate::auth::RefreshCoordinator;
use crate::auth::RefreshFlow;
use crate::auth::SessionEvent;
use crate::auth::SessionSignal;
use crate::auth::SessionTimer;
use crate::auth::TokenGrant;
use crate::auth::is_auth_endpoint;
use crate::config::ClientConfig;
use crate::envelope;
use crate::error::ApiError;
use crate::error::AuthError;
use crate::error::ConfigError;
use crate::error::Error;
use crate::network::classify_network_failure;
use crate::notify::LogNotifier;
use crate::notify::Notification;
use crate::notify::Notifier;
use crate::storage::CredentialStore;
use crate::storage::StoredCredentials;
use crate::transport::ApiRequest;
use crate::transport::ApiResponse;
use crate::transport::Method;
use crate::transport::ReqwestTransport;
use crate::transport::Transport;

/// Message shown when the refresh call fails.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Message shown when the idle timeout ends the session.
pub const SESSION_IDLE_MESSAGE: &str = "Your session has expired due to inactivity.";

/// Default message for a rejected login.
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid email or password";

/// Authenticated client for the lodging API.
///
/// Attaches the stored bearer token to every request, classifies failures,
/// and recovers from an expired access token with a single shared refresh
/// followed by one replay of each failed request.
///
/// This client is cheap to clone (uses `Arc` internally). Clones share the
/// refresh state; separately built clients do not.
///
/// # Example
///
/// ```ignore
/// use lodging_lib::{ClientConfig, LodgingClient, storage::MemoryCredentialStore};
///
/// let client = LodgingClient::builder()
///     .config(ClientConfig::from_env()?)
///     .store(MemoryCredentialStore::new())
///     .build()?;
///
/// let hotels: serde_json::Value = client.get_json("/api/Hotel/GetHotelList").await?;
/// ```
#[derive(Clone)]
pub struct LodgingClient {
    inner: Arc<LodgingClientInner>,
}

struct LodgingClientInner {
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    refresh_flow: Arc<dyn RefreshFlow>,
    notifier: Arc<dyn Notifier>,
    coordinator: RefreshCoordinator,
    session: SessionSignal,
    timer: Mutex<SessionTimer>,
}

impl LodgingClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> LodgingClientBuilder<Missing, Missing> {
        LodgingClientBuilder::new()
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Sends a request through the interceptor chain.
    ///
    /// Relative URLs are resolved against the base URL and the stored access
    /// token is attached. Every error is returned only after its side effects
    /// (notification, storage mutation, session signal) have happened.
    ///
    /// Once the idle timeout has passed, nothing is sent and
    /// [`Error::SessionIdle`] is returned.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        self.check_idle().await?;
        let request = self.prepare(request).await?;
        self.dispatch(request).await
    }

    /// Sends a GET request.
    pub async fn get(&self, url: &str) -> Result<ApiResponse, Error> {
        self.send(ApiRequest::get(url)).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: Value) -> Result<ApiResponse, Error> {
        self.send(ApiRequest::post(url).json(body)).await
    }

    /// Sends a PUT request with a JSON body.
    pub async fn put(&self, url: &str, body: Value) -> Result<ApiResponse, Error> {
        self.send(ApiRequest::new(Method::Put, url).json(body)).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, url: &str) -> Result<ApiResponse, Error> {
        self.send(ApiRequest::new(Method::Delete, url)).await
    }

    /// Sends a GET request and decodes the response body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let response = self.get(url).await?;
        decode(response.body)
    }

    /// Sends a POST request with a serialized body and decodes the response.
    pub async fn post_json<T, B>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| Error::Parse {
            message: e.to_string(),
            body: Value::Null,
        })?;
        let response = self.post(url, body).await?;
        decode(response.body)
    }

    /// Logs in and persists the returned tokens.
    ///
    /// The backend answers `{ "message": "OK", "data": { "USER_LOGIN_DETAILS": .. } }`
    /// on success. Returns the login details.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Value, Error> {
        let body = serde_json::to_value(credentials).map_err(|e| Error::Parse {
            message: e.to_string(),
            body: Value::Null,
        })?;
        let login_path = self.inner.config.login_path.clone();
        let response = self.post(&login_path, body).await?;

        if response.body.get("message").and_then(Value::as_str) != Some("OK") {
            let message = response
                .body
                .get("message")
                .or_else(|| response.body.get("Message"))
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(INVALID_LOGIN_MESSAGE)
                .to_string();
            log::warn!("login rejected: {}", message);
            return Err(Error::Unauthorized {
                status: 401,
                message,
            });
        }

        let details = match response.body.pointer("/data/USER_LOGIN_DETAILS") {
            Some(Value::Array(entries)) => entries.first().cloned(),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.clone()),
        }
        .ok_or_else(|| {
            log::warn!("login response is missing user details");
            Error::Unauthorized {
                status: 401,
                message: INVALID_LOGIN_MESSAGE.to_string(),
            }
        })?;

        let now = Utc::now();
        let credentials = TokenGrant::from_value(&details)
            .and_then(|grant| grant.apply(&StoredCredentials::default(), now))
            .map_err(|e| Error::Parse {
                message: e.to_string(),
                body: details.clone(),
            })?;
        self.inner.store.save(&credentials).await?;

        self.inner.session.reset();
        self.timer().start(now, None);
        log::info!("logged in");
        Ok(details)
    }

    /// Logs out.
    ///
    /// The logout call is best effort; stored credentials are cleared
    /// whatever its outcome.
    pub async fn logout(&self) -> Result<(), Error> {
        let logout_path = self.inner.config.logout_path.clone();
        if let Err(e) = self.send(ApiRequest::post(logout_path)).await {
            log::warn!("logout request failed: {}", e);
        }
        self.inner.store.clear().await?;
        self.timer().stop();
        log::info!("logged out");
        Ok(())
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.session.subscribe()
    }

    /// Returns `true` once the session expired, until the next login or
    /// successful refresh.
    pub fn is_session_expired(&self) -> bool {
        self.inner.session.is_expired()
    }

    /// Loads the stored credentials.
    pub async fn credentials(&self) -> Result<StoredCredentials, Error> {
        Ok(self.inner.store.load().await?)
    }

    /// Records user activity, extending the idle timeout.
    ///
    /// Returns `false` if the session had already timed out.
    pub fn record_activity(&self) -> bool {
        self.timer().touch(Utc::now())
    }

    /// Time left before the idle timeout.
    pub fn session_remaining(&self) -> Duration {
        self.timer().remaining(Utc::now())
    }

    /// Returns `true` if the idle timeout has passed.
    pub fn is_session_idle(&self) -> bool {
        self.timer().is_expired(Utc::now())
    }

    /// Number of refresh calls issued so far.
    pub fn refreshes_started(&self) -> u64 {
        self.inner.coordinator.refreshes_started()
    }

    fn timer(&self) -> MutexGuard<'_, SessionTimer> {
        self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ends a session whose idle timeout has passed.
    async fn check_idle(&self) -> Result<(), Error> {
        let idle = self.timer().is_expired(Utc::now());
        if !idle {
            return Ok(());
        }

        log::warn!("session timed out after inactivity");
        self.timer().stop();
        if let Err(e) = self.inner.store.clear().await {
            log::error!("failed to clear credentials: {}", e);
        }
        self.notify(SESSION_IDLE_MESSAGE);
        self.inner.session.expire();
        Err(Error::SessionIdle)
    }

    /// Outbound interception: resolve the URL and attach the bearer token.
    ///
    /// A retried request keeps the Authorization header it already carries.
    async fn prepare(&self, mut request: ApiRequest) -> Result<ApiRequest, Error> {
        request.url = self.inner.config.resolve(&request.url)?;
        if request.retried && request.header_value("Authorization").is_some() {
            return Ok(request);
        }
        if let Some(token) = self.inner.store.access_token().await? {
            request = request.bearer(&token);
        }
        Ok(request)
    }

    /// Inbound interception.
    fn dispatch(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, Error>> {
        async move {
            let response = match self.inner.transport.send(request.clone()).await {
                Ok(response) => response,
                Err(err) => {
                    let error = classify_network_failure(
                        self.inner.transport.as_ref(),
                        &request.url,
                        &self.inner.config.origin,
                        &err,
                    )
                    .await;
                    log::error!("{} {}: {}", request.url, error.message, err);
                    self.notify(&error.message);
                    return Err(error.into());
                }
            };

            if response.is_success() {
                return Ok(response);
            }

            match response.status {
                401 | 403 => self.handle_auth_failure(request, response).await,
                status => Err(self.api_error(&request, response, status).into()),
            }
        }
        .boxed()
    }

    async fn handle_auth_failure(
        &self,
        mut request: ApiRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, Error> {
        let status = response.status;

        if request.retried {
            log::warn!("{} rejected again after refresh", request.url);
            return Err(self.expire(status));
        }

        if is_auth_endpoint(&request.url) {
            let message = response
                .body
                .get("message")
                .or_else(|| response.body.get("Message"))
                .and_then(Value::as_str)
                .unwrap_or("Unauthorized")
                .to_string();
            return Err(Error::Unauthorized { status, message });
        }

        let credentials = self.inner.store.load().await?;
        let expiry = credentials.expiry_state(Utc::now());
        if let Some(current) = credentials.access_token.as_deref()
            && !expiry.access_expired
            && request.bearer_token() != Some(current)
        {
            // refreshed while this request was in flight
            log::debug!("replaying {} with the current token", request.url);
            request.retried = true;
            let request = request.bearer(current);
            return self.dispatch(request).await;
        }
        if expiry.access_expired && expiry.refresh_expired {
            log::warn!("access and refresh tokens both expired");
            return Err(self.expire(status));
        }
        if !expiry.access_expired {
            log::warn!("{} rejected with a valid access token", request.url);
            return Err(self.expire(status));
        }
        if credentials.refresh_token.is_none() {
            log::warn!("access token expired and no refresh token stored");
            return Err(self.expire(status));
        }

        request.retried = true;
        match self.inner.coordinator.refresh(|| self.run_refresh()).await {
            Ok(token) => {
                log::debug!("replaying {} with refreshed token", request.url);
                let request = request.bearer(&token);
                self.dispatch(request).await
            }
            Err(err) => {
                log::error!("token refresh failed: {}", err);
                if let Err(e) = self.inner.store.clear().await {
                    log::error!("failed to clear credentials: {}", e);
                }
                self.notify(SESSION_EXPIRED_MESSAGE);
                self.inner.session.expire();
                Err(Error::Refresh(err))
            }
        }
    }

    /// Leader side of the single-flight refresh: call the endpoint and persist.
    async fn run_refresh(&self) -> Result<String, AuthError> {
        let current = self
            .inner
            .store
            .load()
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;

        let grant = self.inner.refresh_flow.refresh(refresh_token).await?;
        let updated = grant.apply(&current, Utc::now())?;
        self.inner
            .store
            .save(&updated)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        self.inner.session.restore();
        log::info!("access token refreshed");
        updated.access_token.ok_or(AuthError::MissingAccessToken)
    }

    fn api_error(&self, request: &ApiRequest, response: ApiResponse, status: u16) -> ApiError {
        if !envelope::is_normalized_status(status) {
            log::debug!("{} failed with HTTP {}", request.url, status);
            return ApiError::with_body(
                status,
                format!("Request failed with status code {}", status),
                response.body,
            );
        }

        let detail = envelope::extract_detail(status, &response.body);
        let mut body = response.body;
        envelope::normalize_body(&mut body, &detail);
        log::error!("{} failed with HTTP {}: {}", request.url, status, detail);
        self.notify(&detail);

        let mut error = ApiError::with_body(status, detail, body);
        error.notified = true;
        error
    }

    fn expire(&self, status: u16) -> Error {
        self.inner.session.expire();
        Error::SessionExpired { status }
    }

    fn notify(&self, message: &str) {
        self.inner.notifier.notify(Notification::error(message));
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, Error> {
    serde_json::from_value(body.clone()).map_err(|e| Error::Parse {
        message: e.to_string(),
        body,
    })
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`LodgingClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `config` - The [`ClientConfig`]
/// - `store` - A [`CredentialStore`] implementation
///
/// # Example
///
/// ```ignore
/// let client = LodgingClient::builder()
///     .config(ClientConfig::new("https://api.example.com"))
///     .store(SqliteCredentialStore::open("credentials.db").await?)
///     .notifier(|n: Notification| eprintln!("{}", n.message))
///     .build()?;
/// ```
pub struct LodgingClientBuilder<Config, Store> {
    config: Config,
    store: Store,
    transport: Option<Arc<dyn Transport>>,
    refresh_flow: Option<Arc<dyn RefreshFlow>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl LodgingClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: Missing,
            store: Missing,
            transport: None,
            refresh_flow: None,
            notifier: None,
        }
    }
}

impl Default for LodgingClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> LodgingClientBuilder<Missing, S> {
    /// Sets the client configuration.
    pub fn config(self, config: ClientConfig) -> LodgingClientBuilder<Set<ClientConfig>, S> {
        LodgingClientBuilder {
            config: Set(config),
            store: self.store,
            transport: self.transport,
            refresh_flow: self.refresh_flow,
            notifier: self.notifier,
        }
    }
}

impl<C> LodgingClientBuilder<C, Missing> {
    /// Sets the credential store.
    pub fn store<T: CredentialStore + 'static>(
        self,
        store: T,
    ) -> LodgingClientBuilder<C, Set<Arc<dyn CredentialStore>>> {
        self.shared_store(Arc::new(store))
    }

    /// Sets a credential store shared with other owners.
    pub fn shared_store(
        self,
        store: Arc<dyn CredentialStore>,
    ) -> LodgingClientBuilder<C, Set<Arc<dyn CredentialStore>>> {
        LodgingClientBuilder {
            config: self.config,
            store: Set(store),
            transport: self.transport,
            refresh_flow: self.refresh_flow,
            notifier: self.notifier,
        }
    }
}

impl<C, S> LodgingClientBuilder<C, S> {
    /// Sets a custom transport.
    ///
    /// If not set, a [`ReqwestTransport`] honoring the configured timeouts is
    /// created.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets a custom refresh flow.
    ///
    /// If not set, an [`HttpRefreshFlow`] over the client's transport is used.
    pub fn refresh_flow<T: RefreshFlow + 'static>(mut self, flow: T) -> Self {
        self.refresh_flow = Some(Arc::new(flow));
        self
    }

    /// Sets the notifier for global errors.
    ///
    /// Defaults to [`LogNotifier`].
    pub fn notifier<T: Notifier + 'static>(mut self, notifier: T) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }
}

impl LodgingClientBuilder<Set<ClientConfig>, Set<Arc<dyn CredentialStore>>> {
    /// Builds the [`LodgingClient`].
    ///
    /// This method is only available when both `config` and `store` have been set.
    /// A missing base URL is not checked here; every request reports it as
    /// [`ConfigError::MissingBaseUrl`] before anything is sent.
    pub fn build(self) -> Result<LodgingClient, ConfigError> {
        let config = self.config.0;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let transport =
                    ReqwestTransport::with_timeouts(config.timeout, config.connect_timeout)
                        .map_err(|e| ConfigError::invalid("http client", e.message))?;
                Arc::new(transport) as Arc<dyn Transport>
            }
        };
        let refresh_flow = self.refresh_flow.unwrap_or_else(|| {
            Arc::new(HttpRefreshFlow::new(transport.clone(), config.clone())) as Arc<dyn RefreshFlow>
        });
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(LogNotifier) as Arc<dyn Notifier>);
        let timer = SessionTimer::new(config.session_timeout);

        Ok(LodgingClient {
            inner: Arc::new(LodgingClientInner {
                config,
                store: self.store.0,
                transport,
                refresh_flow,
                notifier,
                coordinator: RefreshCoordinator::new(),
                session: SessionSignal::new(),
                timer: Mutex::new(timer),
            }),
        })
    }
}
