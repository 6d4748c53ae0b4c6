pub mod auth;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/verify/request      request a verification code (public)
/// /auth/verify/check        submit the code (public)
/// /auth/signup              create account from verified signup (public)
/// /auth/login               login (public)
/// /auth/signout             invalidate session, clear cookies (public)
/// /auth/me                  current identity, null if anonymous
///
/// /greeting                 sample protected endpoint (requires auth)
/// ```
///
/// The reauthentication middleware is mounted over the whole tree by
/// [`crate::router::build_app_router`], so every route sees a resolved
/// identity in its request extensions.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route("/greeting", get(handlers::auth::greeting))
}
