//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the application through [`gatehouse_api::router::build_app_router`]
//! so tests exercise the exact middleware stack production uses, including
//! the reauthentication layer.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use gatehouse_api::auth::tokens::TokenConfig;
use gatehouse_api::config::ServerConfig;
use gatehouse_api::state::AppState;

/// Build a test `ServerConfig` with fixture token secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        tokens: test_token_config(),
    }
}

/// Token config with known, distinct secrets for use in tests.
pub fn test_token_config() -> TokenConfig {
    TokenConfig::new(
        "test-access-secret-long-enough-for-hmac".to_string(),
        "test-refresh-secret-long-enough-for-hmac".to_string(),
        15,
    )
}

/// Build the full application router against the given pool.
///
/// SMTP is never configured in tests, so verification emails are skipped
/// and handlers fall back to their no-mailer path.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer: None,
    };
    gatehouse_api::router::build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request carrying a `Cookie` header.
pub async fn get_with_cookies(app: Router, uri: &str, cookies: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(COOKIE, cookies)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a `Cookie` header.
pub async fn post_json_with_cookies(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    cookies: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, cookies)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a bodyless POST request with a `Cookie` header.
pub async fn post_with_cookies(app: Router, uri: &str, cookies: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, cookies)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values on a response, in order.
pub fn set_cookie_values(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Extract a cookie's value from a list of `Set-Cookie` strings.
pub fn extract_cookie(set_cookies: &[String], name: &str) -> Option<String> {
    for entry in set_cookies {
        let pair = entry.split(';').next()?.trim();
        let (key, value) = pair.split_once('=')?;
        if key == name {
            return Some(value.to_string());
        }
    }
    None
}

/// Build a request `Cookie` header value from name/value pairs.
pub fn cookie_header(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("; ")
}
