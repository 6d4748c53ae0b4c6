//! Reauthentication middleware and identity extractors for Axum handlers.
//!
//! The middleware runs the reauthentication procedure once per request,
//! stashes the (possibly anonymous) identity in request extensions, and --
//! when a silent refresh happened -- appends the rotated token cookies to
//! the response. Handlers then choose their strictness:
//!
//! ```ignore
//! async fn strict(user: AuthUser) -> AppResult<Json<()>> { ... }      // 401 if anonymous
//! async fn soft(user: MaybeAuthUser) -> AppResult<Json<()>> { ... }   // tolerates anonymous
//! ```

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use gatehouse_core::error::CoreError;
use gatehouse_core::types::DbId;

use crate::auth::reauth::{self, Identity};
use crate::error::AppError;
use crate::state::AppState;

/// The identity the reauthentication middleware resolved for this request.
/// `None` means the request is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Option<Identity>);

/// Response-extension marker telling the middleware not to append rotated
/// token cookies. Set by every handler that writes cookies itself (login,
/// signup, sign-out): their headers describe the identity the response body
/// reports, and rotated cookies landing after them would win in a browser.
#[derive(Debug, Clone, Copy)]
pub struct CookieRotationSuppressed;

/// Middleware: reauthenticate the request and inject [`CurrentIdentity`].
///
/// Rotated token cookies (if any) are appended to whatever response the
/// inner handler produces, including error responses, unless the handler
/// marked the response with [`CookieRotationSuppressed`].
pub async fn reauthenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let outcome = reauth::reauthenticate(&state, request.headers()).await?;

    request
        .extensions_mut()
        .insert(CurrentIdentity(outcome.identity));

    let mut response = next.run(request).await;
    if response
        .extensions()
        .get::<CookieRotationSuppressed>()
        .is_none()
    {
        for cookie in outcome.set_cookies {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }
    Ok(response)
}

/// Authenticated user, required. Rejects anonymous requests with the
/// generic unauthorized error.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<CurrentIdentity>()
            .and_then(|current| current.0.clone())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("request is anonymous".into()))
            })?;

        Ok(AuthUser {
            user_id: identity.user_id,
            role: identity.role,
        })
    }
}

/// Authenticated user, optional. `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<CurrentIdentity>()
            .and_then(|current| current.0.clone());

        Ok(MaybeAuthUser(identity.map(|identity| AuthUser {
            user_id: identity.user_id,
            role: identity.role,
        })))
    }
}
