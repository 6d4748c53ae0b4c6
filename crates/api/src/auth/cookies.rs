//! Auth token cookies.
//!
//! Both tokens travel as `HttpOnly; Secure; SameSite=Lax` cookies. The
//! refresh cookie is additionally path-scoped to the auth subtree so
//! browsers never attach it to ordinary requests. `Max-Age` is derived from
//! the token's own expiry (minus a small buffer) rather than configured
//! separately, so cookie lifetime and token lifetime cannot drift apart.

use axum::http::header::{HeaderMap, HeaderValue, InvalidHeaderValue, COOKIE};
use chrono::Utc;
use gatehouse_core::types::Timestamp;

/// Cookie carrying the access token (host-wide).
pub const ACCESS_COOKIE: &str = "access_token";

/// Cookie carrying the refresh token (auth subtree only).
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Path scope for the refresh cookie. Ordinary requests never carry it.
const REFRESH_COOKIE_PATH: &str = "/api/v1/auth";

/// Seconds shaved off the cookie lifetime so the cookie dies just before the
/// token it carries, never after.
const MAX_AGE_BUFFER_SECS: i64 = 10;

/// Build the access-token `Set-Cookie` value.
pub fn access_cookie(
    token: &str,
    expires_at: Timestamp,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = max_age_from_expiry(expires_at);
    HeaderValue::from_str(&format!(
        "{ACCESS_COOKIE}={token}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={max_age}"
    ))
}

/// Build the refresh-token `Set-Cookie` value, scoped to the auth subtree.
pub fn refresh_cookie(
    token: &str,
    expires_at: Timestamp,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = max_age_from_expiry(expires_at);
    HeaderValue::from_str(&format!(
        "{REFRESH_COOKIE}={token}; Path={REFRESH_COOKIE_PATH}; HttpOnly; Secure; \
         SameSite=Lax; Max-Age={max_age}"
    ))
}

/// `Set-Cookie` value expiring the access cookie immediately.
pub fn clear_access_cookie() -> HeaderValue {
    HeaderValue::from_static("access_token=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0")
}

/// `Set-Cookie` value expiring the refresh cookie immediately.
pub fn clear_refresh_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "refresh_token=; Path=/api/v1/auth; HttpOnly; Secure; SameSite=Lax; Max-Age=0",
    )
}

/// Read a cookie value from a request's `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

/// Translate a token's absolute expiry into a relative cookie `Max-Age`,
/// clamped to zero for already-expired tokens.
fn max_age_from_expiry(expires_at: Timestamp) -> i64 {
    (expires_at.timestamp() - Utc::now().timestamp() - MAX_AGE_BUFFER_SECS).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_age_is_expiry_minus_buffer() {
        let expires_at = Utc::now() + chrono::Duration::seconds(900);
        let max_age = max_age_from_expiry(expires_at);
        // Allow a second of slack for the clock read.
        assert!((888..=890).contains(&max_age), "got {max_age}");
    }

    #[test]
    fn max_age_never_goes_negative() {
        let expires_at = Utc::now() - chrono::Duration::seconds(30);
        assert_eq!(max_age_from_expiry(expires_at), 0);
    }

    #[test]
    fn access_cookie_attributes() {
        let expires_at = Utc::now() + chrono::Duration::minutes(15);
        let value = access_cookie("tok123", expires_at).unwrap();
        let s = value.to_str().unwrap();

        assert!(s.starts_with("access_token=tok123;"));
        assert!(s.contains("Path=/;"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("Secure"));
        assert!(s.contains("SameSite=Lax"));
    }

    #[test]
    fn refresh_cookie_is_path_scoped() {
        let expires_at = Utc::now() + chrono::Duration::days(7);
        let value = refresh_cookie("tok456", expires_at).unwrap();
        let s = value.to_str().unwrap();

        assert!(s.contains("Path=/api/v1/auth;"));
    }

    #[test]
    fn read_cookie_parses_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("foo=1; access_token=abc.def.ghi; refresh_token=xyz"),
        );

        assert_eq!(
            read_cookie(&headers, ACCESS_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(read_cookie(&headers, REFRESH_COOKIE).as_deref(), Some("xyz"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn read_cookie_ignores_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(read_cookie(&headers, ACCESS_COOKIE), None);
    }
}
