//! Handlers for login, sign-out, and identity probes.

use axum::extract::State;
use axum::http::header::{HeaderMap, SET_COOKIE};
use axum::http::StatusCode;
use axum::{Extension, Json};
use gatehouse_core::error::CoreError;
use gatehouse_core::types::DbId;
use gatehouse_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_secret;
use crate::auth::{cookies, tokens};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{
    AuthUser, CookieRotationSuppressed, CurrentIdentity, MaybeAuthUser,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public user info returned by login and signup.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub username: Option<String>,
}

/// Successful authentication response. Tokens ride in cookies, not the body.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
}

/// Identity payload for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeIdentity {
    pub id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Response body for `GET /auth/me`. `user` is `null` when anonymous.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<MeIdentity>,
}

/// Response body for `GET /greeting`.
#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub greeting: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. On success, sets both token cookies.
/// Unknown email, missing credential, and wrong password are deliberately
/// indistinguishable in the response.
///
/// The response is marked with [`CookieRotationSuppressed`]: if the request
/// arrived carrying another account's refresh cookie, the middleware's
/// rotated cookies must not land after (and thus override) the cookies of
/// the identity that just logged in.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<(
    Extension<CookieRotationSuppressed>,
    HeaderMap,
    Json<AuthResponse>,
)> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("unknown email".into())))?;

    // A user without a password hash never completed signup.
    let password_hash = user.password_hash.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("account has no credential".into()))
    })?;

    if !verify_secret(&input.password, password_hash)? {
        return Err(AppError::Core(CoreError::Unauthorized(
            "password mismatch".into(),
        )));
    }

    let headers = establish_session(&state, user.id).await?;

    Ok((
        Extension(CookieRotationSuppressed),
        headers,
        Json(AuthResponse {
            user: UserInfo {
                id: user.id,
                email: user.email,
                username: user.username,
            },
        }),
    ))
}

/// POST /api/v1/auth/signout
///
/// Invalidate the refresh token's session (best effort) and expire both
/// cookies. If the reauthentication middleware already rotated the session
/// for this request, the successor session is invalidated too, and the
/// rotated cookies are suppressed so the clearing headers win. Always
/// succeeds with 204.
pub async fn signout(
    State(state): State<AppState>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    request_headers: HeaderMap,
) -> AppResult<(StatusCode, Extension<CookieRotationSuppressed>, HeaderMap)> {
    if let Some(token) = cookies::read_cookie(&request_headers, cookies::REFRESH_COOKIE) {
        if let Ok(claims) = tokens::verify_refresh(&token, &state.config.tokens) {
            SessionRepo::invalidate(&state.pool, claims.sid).await?;
        }
    }

    if let Some(session_id) = identity.and_then(|identity| identity.session_id) {
        SessionRepo::invalidate(&state.pool, session_id).await?;
    }

    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, cookies::clear_access_cookie());
    headers.append(SET_COOKIE, cookies::clear_refresh_cookie());

    Ok((
        StatusCode::NO_CONTENT,
        Extension(CookieRotationSuppressed),
        headers,
    ))
}

/// GET /api/v1/auth/me
///
/// Soft identity probe: answers for anonymous callers too.
pub async fn me(MaybeAuthUser(user): MaybeAuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: user.map(|u| MeIdentity {
            id: u.user_id,
            role: u.role,
        }),
    })
}

/// GET /api/v1/greeting
///
/// A protected endpoint: anonymous requests are rejected by the `AuthUser`
/// extractor before this body runs.
pub async fn greeting(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<GreetingResponse>> {
    let record = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user.user_id.to_string(),
        }))?;

    let name = record.username.unwrap_or(record.email);
    Ok(Json(GreetingResponse {
        greeting: format!("Hello, {name}!"),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a session for the user and build the access + refresh `Set-Cookie`
/// headers, with the refresh token's expiry bound to the session's.
pub(crate) async fn establish_session(state: &AppState, user_id: DbId) -> AppResult<HeaderMap> {
    let config = &state.config.tokens;
    let session = SessionRepo::create(&state.pool, user_id).await?;

    let access = tokens::issue_access(user_id, None, config)?;
    let refresh = tokens::issue_refresh(user_id, session.id, session.expires_at, config)?;

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        cookies::access_cookie(&access.token, access.expires_at)
            .map_err(|e| AppError::InternalError(format!("bad cookie value: {e}")))?,
    );
    headers.append(
        SET_COOKIE,
        cookies::refresh_cookie(&refresh.token, refresh.expires_at)
            .map_err(|e| AppError::InternalError(format!("bad cookie value: {e}")))?,
    );
    Ok(headers)
}
