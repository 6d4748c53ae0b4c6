//! Per-request reauthentication.
//!
//! Evaluated once for every request under `/api/v1`, with the request's
//! cookie set as input:
//!
//! 1. A verifying access token settles the request immediately -- no store
//!    I/O, no cookie writes. This keeps the common case free of persistence.
//! 2. Otherwise a verifying refresh token triggers a session rotation; on
//!    success the caller gets a fresh access + refresh cookie pair and the
//!    request proceeds. A dead session falls through.
//! 3. Otherwise the request is anonymous. Whether that is acceptable is the
//!    route's call: handlers demand identity via the `AuthUser` extractor or
//!    tolerate its absence via `MaybeAuthUser`.

use axum::http::{HeaderMap, HeaderValue};
use gatehouse_core::types::DbId;
use gatehouse_db::repositories::{RenewError, SessionRepo};

use crate::auth::{cookies, tokens};
use crate::error::AppError;
use crate::state::AppState;

/// The identity a request proved.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: DbId,
    pub role: Option<String>,
    /// The live session backing this request, when known. Set only on the
    /// rotate path; access tokens do not name their session.
    pub session_id: Option<DbId>,
}

/// Result of running the reauthentication procedure.
pub struct ReauthOutcome {
    /// `None` means the request is anonymous.
    pub identity: Option<Identity>,
    /// `Set-Cookie` values to append to the response. Non-empty only when a
    /// silent refresh rotated the session.
    pub set_cookies: Vec<HeaderValue>,
}

impl ReauthOutcome {
    fn anonymous() -> Self {
        Self {
            identity: None,
            set_cookies: Vec::new(),
        }
    }
}

/// Run the reauthentication procedure against a request's headers.
///
/// Only store I/O failures are errors; every authentication-shaped failure
/// degrades to an anonymous outcome.
pub async fn reauthenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<ReauthOutcome, AppError> {
    let config = &state.config.tokens;

    // Fast path: a live access token needs nothing else.
    if let Some(token) = cookies::read_cookie(headers, cookies::ACCESS_COOKIE) {
        if let Ok(claims) = tokens::verify_access(&token, config) {
            return Ok(ReauthOutcome {
                identity: Some(Identity {
                    user_id: claims.sub,
                    role: claims.role,
                    session_id: None,
                }),
                set_cookies: Vec::new(),
            });
        }
    }

    // Rotate path: redeem the refresh token against its session.
    if let Some(token) = cookies::read_cookie(headers, cookies::REFRESH_COOKIE) {
        if let Ok(claims) = tokens::verify_refresh(&token, config) {
            match SessionRepo::renew(&state.pool, claims.sid, claims.sub).await {
                Ok(session) => {
                    let access = tokens::issue_access(claims.sub, None, config)?;
                    let refresh =
                        tokens::issue_refresh(claims.sub, session.id, session.expires_at, config)?;

                    let set_cookies = vec![
                        cookies::access_cookie(&access.token, access.expires_at)
                            .map_err(|e| AppError::InternalError(format!("bad cookie value: {e}")))?,
                        cookies::refresh_cookie(&refresh.token, refresh.expires_at)
                            .map_err(|e| AppError::InternalError(format!("bad cookie value: {e}")))?,
                    ];

                    tracing::debug!(user_id = %claims.sub, old_session = %claims.sid,
                        new_session = %session.id, "silent refresh rotated session");

                    return Ok(ReauthOutcome {
                        identity: Some(Identity {
                            user_id: claims.sub,
                            role: None,
                            session_id: Some(session.id),
                        }),
                        set_cookies,
                    });
                }
                Err(RenewError::SessionExpiredOrInvalid) => {
                    tracing::debug!(session_id = %claims.sid, "refresh token points at a dead session");
                }
                Err(RenewError::Db(e)) => return Err(AppError::Database(e)),
            }
        }
    }

    Ok(ReauthOutcome::anonymous())
}
