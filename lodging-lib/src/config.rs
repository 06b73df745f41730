//! Client configuration

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default path of the token refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/api/Auth/RefreshToken";
/// Default path of the login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/api/Auth/Login";
/// Default path of the logout endpoint.
pub const DEFAULT_LOGOUT_PATH: &str = "/api/Auth/Logout";

/// Configuration for a [`LodgingClient`](crate::LodgingClient).
///
/// A missing base URL is accepted here and reported per request as
/// [`ConfigError::MissingBaseUrl`], so a misconfigured deployment fails on
/// the first call rather than at startup.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use lodging_lib::ClientConfig;
///
/// let config = ClientConfig::new("https://api.example.com")
///     .with_timeout(Duration::from_secs(30))
///     .with_origin("https://admin.example.com");
/// assert_eq!(config.base_url(), Some("https://api.example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Option<String>,
    /// Path of the refresh endpoint, relative to the base URL.
    pub refresh_path: String,
    /// Path of the login endpoint, relative to the base URL.
    pub login_path: String,
    /// Path of the logout endpoint, relative to the base URL.
    pub logout_path: String,
    /// Origin reported in CORS messages.
    pub origin: String,
    /// Per-request timeout. `None` uses the transport default.
    pub timeout: Option<Duration>,
    /// Connection timeout applied when building the HTTP client.
    pub connect_timeout: Option<Duration>,
    /// Idle session timeout.
    ///
    /// Default: 15 minutes
    pub session_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            origin: "http://localhost".to_string(),
            timeout: None,
            connect_timeout: None,
            session_timeout: Duration::from_secs(15 * 60),
        }
    }
}

impl ClientConfig {
    /// Creates a config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Loads the configuration from `LODGING_*` environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `LODGING_API_BASE_URL` | base URL |
    /// | `LODGING_ORIGIN` | origin |
    /// | `LODGING_TIMEOUT_SECS` | timeout |
    /// | `LODGING_CONNECT_TIMEOUT_SECS` | connect timeout |
    /// | `LODGING_SESSION_TIMEOUT_MINUTES` | session timeout |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("LODGING_API_BASE_URL").filter(|u| !u.trim().is_empty()) {
            url::Url::parse(url.trim())
                .map_err(|e| ConfigError::invalid("LODGING_API_BASE_URL", e.to_string()))?;
            config = config.with_base_url(url);
        }
        if let Some(origin) = lookup("LODGING_ORIGIN").filter(|o| !o.trim().is_empty()) {
            config.origin = origin;
        }
        if let Some(secs) = parse_number("LODGING_TIMEOUT_SECS", &lookup)? {
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_number("LODGING_CONNECT_TIMEOUT_SECS", &lookup)? {
            config.connect_timeout = Some(Duration::from_secs(secs));
        }
        match parse_number("LODGING_SESSION_TIMEOUT_MINUTES", &lookup)? {
            Some(0) => {
                log::warn!("LODGING_SESSION_TIMEOUT_MINUTES is 0, using default");
            }
            Some(minutes) => {
                let secs = minutes.checked_mul(60).ok_or_else(|| {
                    ConfigError::invalid("LODGING_SESSION_TIMEOUT_MINUTES", "value is too large")
                })?;
                config.session_timeout = Duration::from_secs(secs);
            }
            None => {}
        }

        Ok(config)
    }

    /// Sets the base URL. Blank values leave the URL unset.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        self.base_url = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Sets the origin reported in CORS messages.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the refresh endpoint path.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Sets the idle session timeout.
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Returns the base URL, if configured.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Returns the base URL or the configuration error for a missing one.
    pub fn ensure_base_url(&self) -> Result<&str, ConfigError> {
        self.base_url().ok_or(ConfigError::MissingBaseUrl)
    }

    /// Resolves a request target against the base URL.
    ///
    /// Absolute `http(s)://` URLs are returned unchanged.
    pub fn resolve(&self, target: &str) -> Result<String, ConfigError> {
        let base = self.ensure_base_url()?;
        if is_absolute(target) {
            return Ok(target.to_string());
        }
        Ok(format!("{}/{}", base, target.trim_start_matches('/')))
    }
}

fn is_absolute(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn parse_number<F>(key: &str, lookup: &F) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, e.to_string())),
    }
}
