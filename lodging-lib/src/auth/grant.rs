//! Token grant parsing shared by login and refresh.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::TimeDelta;
use chrono::Utc;
use serde_json::Value;

use crate::error::AuthError;
use crate::storage::StoredCredentials;

/// Tokens and expiry information returned by the login or refresh endpoint.
///
/// Field names follow the backend, which is inconsistent about casing:
/// the access token may arrive as `accessToken`, `AccessToken` or `token`,
/// and the first non-empty one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenGrant {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Access token lifetime in minutes.
    pub access_ttl_minutes: Option<f64>,
    /// Absolute access token expiry.
    pub access_expires_at: Option<DateTime<Utc>>,
    /// Refresh token lifetime in days.
    pub refresh_ttl_days: Option<f64>,
    /// Absolute refresh token expiry.
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

impl TokenGrant {
    /// Parses a grant from a refresh response body.
    ///
    /// Reads `data.REFRESH_TOKEN_RESPONSE[0]` when present, the top-level
    /// object otherwise.
    pub fn from_refresh_response(body: &Value) -> Result<Self, AuthError> {
        let container = body
            .get("data")
            .and_then(|data| data.get("REFRESH_TOKEN_RESPONSE"))
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .unwrap_or(body);
        Self::from_value(container)
    }

    /// Parses a grant from a single token container object.
    pub fn from_value(container: &Value) -> Result<Self, AuthError> {
        if !container.is_object() {
            return Err(AuthError::Parse(format!(
                "expected a token object, got {}",
                json_type(container)
            )));
        }
        Ok(Self {
            access_token: first_string(container, &["accessToken", "AccessToken", "token"]),
            refresh_token: first_string(container, &["refreshToken", "RefreshToken"]),
            access_ttl_minutes: container
                .get("TokenExpirationInMinutes")
                .and_then(Value::as_f64),
            access_expires_at: first_timestamp(
                container,
                &["accessTokenExpiryDateTime", "AccessTokenExpiryDateTime"],
            ),
            refresh_ttl_days: container.get("RefreshTokenExpiresAt").and_then(Value::as_f64),
            refresh_expires_at: first_timestamp(
                container,
                &["refreshTokenExpiryDateTime", "RefreshTokenExpiryDateTime"],
            ),
        })
    }

    /// Resolves the access token expiry relative to `now`.
    ///
    /// A TTL wins over an absolute timestamp.
    pub fn access_expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.access_ttl_minutes
            .and_then(|minutes| offset_millis(now, minutes * 60_000.0))
            .or(self.access_expires_at)
    }

    /// Resolves the refresh token expiry relative to `now`.
    pub fn refresh_expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.refresh_ttl_days
            .and_then(|days| offset_millis(now, days * 86_400_000.0))
            .or(self.refresh_expires_at)
    }

    /// Merges this grant into `current`.
    ///
    /// The access token is required. Anything else the grant omits keeps
    /// its current value.
    pub fn apply(
        &self,
        current: &StoredCredentials,
        now: DateTime<Utc>,
    ) -> Result<StoredCredentials, AuthError> {
        let access_token = self
            .access_token
            .clone()
            .ok_or(AuthError::MissingAccessToken)?;

        Ok(StoredCredentials {
            access_token: Some(access_token),
            refresh_token: self
                .refresh_token
                .clone()
                .or_else(|| current.refresh_token.clone()),
            access_expires_at: self.access_expiry(now).or(current.access_expires_at),
            refresh_expires_at: self.refresh_expiry(now).or(current.refresh_expires_at),
        })
    }
}

/// Shifts `now` by a server-supplied TTL.
///
/// The result is clamped to the Unix epoch and the end of year 9999 so it
/// survives an RFC 3339 round trip. `NaN` yields `None`.
fn offset_millis(now: DateTime<Utc>, millis: f64) -> Option<DateTime<Utc>> {
    if millis.is_nan() {
        return None;
    }
    let latest = latest_expiry();
    let shifted = TimeDelta::try_milliseconds(millis as i64)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if millis > 0.0 {
            latest
        } else {
            DateTime::<Utc>::UNIX_EPOCH
        });
    Some(shifted.clamp(DateTime::<Utc>::UNIX_EPOCH, latest))
}

fn latest_expiry() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn first_string(container: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| container.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Unparseable timestamps count as absent.
fn first_timestamp(container: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| container.get(*key).and_then(Value::as_str))
        .find_map(parse_timestamp)
}

/// Parses RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_refresh_envelope() {
        let body = json!({
            "message": "OK",
            "data": { "REFRESH_TOKEN_RESPONSE": [{
                "AccessToken": "new-access",
                "RefreshToken": "new-refresh",
                "TokenExpirationInMinutes": 30,
                "RefreshTokenExpiresAt": 7
            }] }
        });

        let grant = TokenGrant::from_refresh_response(&body).unwrap();
        assert_eq!(grant.access_token.as_deref(), Some("new-access"));
        assert_eq!(grant.refresh_token.as_deref(), Some("new-refresh"));

        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            grant.access_expiry(now),
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(
            grant.refresh_expiry(now),
            Some(Utc.with_ymd_and_hms(2026, 1, 8, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_top_level_token_alias() {
        let grant = TokenGrant::from_refresh_response(&json!({ "token": "t-1" })).unwrap();
        assert_eq!(grant.access_token.as_deref(), Some("t-1"));
        assert_eq!(grant.refresh_token, None);
    }

    #[test]
    fn test_absolute_refresh_expiry() {
        let grant = TokenGrant::from_value(&json!({
            "accessToken": "a",
            "refreshTokenExpiryDateTime": "2026-03-01T10:00:00Z",
            "accessTokenExpiryDateTime": "2026-02-01T10:00:00"
        }))
        .unwrap();

        let now = Utc::now();
        assert_eq!(
            grant.refresh_expiry(now),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(
            grant.access_expiry(now),
            Some(Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_string_ttl_and_bad_timestamp_ignored() {
        let grant = TokenGrant::from_value(&json!({
            "accessToken": "a",
            "TokenExpirationInMinutes": "30",
            "refreshTokenExpiryDateTime": "next tuesday"
        }))
        .unwrap();
        assert_eq!(grant.access_ttl_minutes, None);
        assert_eq!(grant.refresh_expires_at, None);
    }

    #[test]
    fn test_apply_keeps_unspecified_fields() {
        let now = Utc::now();
        let current = StoredCredentials {
            access_token: Some("old".into()),
            refresh_token: Some("keep-me".into()),
            access_expires_at: Some(now - Duration::minutes(5)),
            refresh_expires_at: Some(now + Duration::days(2)),
        };
        let grant = TokenGrant::from_value(&json!({
            "accessToken": "new",
            "TokenExpirationInMinutes": 15
        }))
        .unwrap();

        let updated = grant.apply(&current, now).unwrap();
        assert_eq!(updated.access_token.as_deref(), Some("new"));
        assert_eq!(updated.refresh_token.as_deref(), Some("keep-me"));
        assert_eq!(updated.access_expires_at, Some(now + Duration::minutes(15)));
        assert_eq!(updated.refresh_expires_at, current.refresh_expires_at);
    }

    #[test]
    fn test_first_non_empty_alias_wins() {
        let grant = TokenGrant::from_value(&json!({
            "accessToken": "",
            "AccessToken": "upper",
            "token": "plain"
        }))
        .unwrap();
        assert_eq!(grant.access_token.as_deref(), Some("upper"));
    }

    #[test]
    fn test_missing_access_token() {
        let grant = TokenGrant::from_value(&json!({ "accessToken": "" })).unwrap();
        assert!(matches!(
            grant.apply(&StoredCredentials::default(), Utc::now()),
            Err(AuthError::MissingAccessToken)
        ));
        assert!(TokenGrant::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let grant = TokenGrant::from_value(&json!({
            "accessToken": "a",
            "TokenExpirationInMinutes": 1e300,
            "RefreshTokenExpiresAt": 1e8
        }))
        .unwrap();

        let now = Utc::now();
        let latest = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let updated = grant.apply(&StoredCredentials::default(), now).unwrap();
        assert_eq!(updated.access_expires_at, Some(latest));
        assert_eq!(updated.refresh_expires_at, Some(latest));
    }

    #[test]
    fn test_negative_ttl_is_already_expired() {
        let grant = TokenGrant::from_value(&json!({
            "accessToken": "a",
            "TokenExpirationInMinutes": -1e300,
            "RefreshTokenExpiresAt": -2
        }))
        .unwrap();

        let now = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(grant.access_expiry(now), Some(DateTime::<Utc>::UNIX_EPOCH));
        assert_eq!(
            grant.refresh_expiry(now),
            Some(Utc.with_ymd_and_hms(2026, 1, 8, 0, 0, 0).unwrap())
        );

        let updated = grant.apply(&StoredCredentials::default(), now).unwrap();
        let expiry = updated.expiry_state(now);
        assert!(expiry.access_expired);
        assert!(expiry.refresh_expired);
    }
}
