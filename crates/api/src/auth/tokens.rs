//! JWT token codec for access and refresh tokens.
//!
//! Both kinds are HS256-signed JWTs, but each kind has its own signing
//! secret, so a token of one kind can never verify as the other. Access
//! tokens expire 15 minutes after issuance. Refresh tokens never pick their
//! own lifetime: the caller supplies the bound session's expiry, which keeps
//! token lifetime and session lifetime from drifting apart.

use chrono::{TimeZone, Utc};
use gatehouse_core::error::CoreError;
use gatehouse_core::types::{DbId, Timestamp};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;

/// Claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject -- the user's id.
    pub sub: DbId,
    /// Optional role name carried for the request window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Claims embedded in every refresh token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// Subject -- the user's id.
    pub sub: DbId,
    /// The session row this token's validity hangs on.
    pub sid: DbId,
    /// Expiration time (UTC Unix timestamp), equal to the session's expiry.
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// A freshly issued token together with its absolute expiry, so cookie
/// lifetimes can be derived from the token itself.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Token signing configuration. Passed in explicitly wherever tokens are
/// issued or verified -- never read from ambient process state -- so tests
/// and multi-tenant setups can carry their own secrets.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens.
    pub refresh_secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_expiry_mins: i64,
}

impl TokenConfig {
    /// Build a config, enforcing the secret invariants.
    ///
    /// # Panics
    ///
    /// Panics if either secret is empty or the two are equal. Reusing one
    /// secret for both kinds would let an access token pass refresh
    /// verification; that is a deployment error we refuse to run with.
    pub fn new(access_secret: String, refresh_secret: String, access_expiry_mins: i64) -> Self {
        assert!(!access_secret.is_empty(), "access token secret must not be empty");
        assert!(!refresh_secret.is_empty(), "refresh token secret must not be empty");
        assert_ne!(
            access_secret, refresh_secret,
            "access and refresh token secrets must differ"
        );
        Self {
            access_secret,
            refresh_secret,
            access_expiry_mins,
        }
    }

    /// Load token configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `ACCESS_TOKEN_SECRET`      | **yes**  | --      |
    /// | `REFRESH_TOKEN_SECRET`     | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRY_MINS` | no       | `15`    |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or the invariants of
    /// [`TokenConfig::new`] fail.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .expect("ACCESS_TOKEN_SECRET must be set in the environment");
        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET")
            .expect("REFRESH_TOKEN_SECRET must be set in the environment");
        let access_expiry_mins: i64 = std::env::var("ACCESS_TOKEN_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_EXPIRY_MINS must be a valid i64");

        Self::new(access_secret, refresh_secret, access_expiry_mins)
    }
}

/// Issue an access token for the given user, expiring `access_expiry_mins`
/// from now.
pub fn issue_access(
    user_id: DbId,
    role: Option<&str>,
    config: &TokenConfig,
) -> Result<IssuedToken, CoreError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::minutes(config.access_expiry_mins);

    let claims = AccessClaims {
        sub: user_id,
        role: role.map(str::to_string),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
    .map_err(|e| CoreError::Internal(format!("access token encoding failed: {e}")))?;

    Ok(IssuedToken { token, expires_at })
}

/// Issue a refresh token bound to a session. `expires_at` must be the
/// session's own expiry; the codec never computes a refresh lifetime itself.
pub fn issue_refresh(
    user_id: DbId,
    session_id: DbId,
    expires_at: Timestamp,
    config: &TokenConfig,
) -> Result<IssuedToken, CoreError> {
    let claims = RefreshClaims {
        sub: user_id,
        sid: session_id,
        exp: expires_at.timestamp(),
        iat: Utc::now().timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
    )
    .map_err(|e| CoreError::Internal(format!("refresh token encoding failed: {e}")))?;

    // Re-derive the expiry from the truncated timestamp so the cookie and the
    // claim agree to the second.
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .unwrap_or(expires_at);

    Ok(IssuedToken { token, expires_at })
}

/// Verify an access token, returning its claims.
///
/// Bad signature, expiry, and malformed claims all collapse into
/// [`CoreError::InvalidToken`]; callers get no signal distinguishing
/// tampering from expiry.
pub fn verify_access(token: &str, config: &TokenConfig) -> Result<AccessClaims, CoreError> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &strict_validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "access token failed verification");
        CoreError::InvalidToken
    })
}

/// Verify a refresh token, returning its claims. Same collapsed error
/// contract as [`verify_access`].
pub fn verify_refresh(token: &str, config: &TokenConfig) -> Result<RefreshClaims, CoreError> {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        &strict_validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "refresh token failed verification");
        CoreError::InvalidToken
    })
}

/// HS256 validation with zero leeway, so expiry boundaries are exact.
fn strict_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}
