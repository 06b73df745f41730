//! Authentication: token grants, single-flight refresh and session state.

mod flow;
mod grant;
mod refresh;
mod session;

pub use flow::HttpRefreshFlow;
pub use flow::RefreshFlow;
pub use grant::TokenGrant;
pub use refresh::RefreshCoordinator;
pub use refresh::RefreshOutcome;
pub use session::SessionEvent;
pub use session::SessionSignal;
pub use session::SessionTimer;

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginRequest {
    /// Creates a login request without "remember me".
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember_me: false,
        }
    }
}

/// Returns `true` for the login and refresh endpoints, which never trigger
/// a refresh themselves.
pub fn is_auth_endpoint(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    url.contains("/auth/login") || url.contains("/auth/refresh")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_endpoint() {
        assert!(is_auth_endpoint("https://api.example.com/api/Auth/Login"));
        assert!(is_auth_endpoint("/api/Auth/RefreshToken"));
        assert!(!is_auth_endpoint("/api/Auth/Logout"));
        assert!(!is_auth_endpoint("/api/Hotel/GetHotelList"));
    }
}
