use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, signup};
use crate::state::AppState;

/// Mount authentication and signup routes (intended for `/api/v1/auth`).
///
/// The refresh cookie is path-scoped to this subtree, so these are the only
/// routes where a silent refresh can occur.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify/request", post(signup::request_verification))
        .route("/verify/check", post(signup::check_otp))
        .route("/signup", post(signup::signup))
        .route("/login", post(auth::login))
        .route("/signout", post(auth::signout))
        .route("/me", get(auth::me))
}
