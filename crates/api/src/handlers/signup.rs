//! Handlers for the three-step signup flow: request a verification code,
//! check the code, then create the account.

use axum::extract::State;
use axum::http::header::HeaderMap;
use axum::http::StatusCode;
use axum::{Extension, Json};
use gatehouse_core::error::CoreError;
use gatehouse_core::otp;
use gatehouse_db::models::user::CreateUser;
use gatehouse_db::repositories::{PendingUserRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_secret, verify_secret};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{establish_session, AuthResponse, UserInfo};
use crate::middleware::auth::CookieRotationSuppressed;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/verify/request`.
#[derive(Debug, Deserialize)]
pub struct RequestVerificationRequest {
    pub email: String,
    pub username: String,
}

/// Response body for `POST /auth/verify/request`.
#[derive(Debug, Serialize)]
pub struct RequestVerificationResponse {
    pub message: &'static str,
}

/// Request body for `POST /auth/verify/check`. The code is a string so
/// clients cannot accidentally strip leading digits.
#[derive(Debug, Deserialize)]
pub struct CheckOtpRequest {
    pub email: String,
    pub code: String,
}

/// Response body for `POST /auth/verify/check`.
#[derive(Debug, Serialize)]
pub struct CheckOtpResponse {
    pub verified: bool,
}

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/verify/request
///
/// Record (or replace) a pending signup for the email and send an 8-digit
/// verification code. Only a hash of the code is stored; repeating the
/// request invalidates any previously emailed code.
pub async fn request_verification(
    State(state): State<AppState>,
    Json(input): Json<RequestVerificationRequest>,
) -> AppResult<Json<RequestVerificationResponse>> {
    validate_email(&input.email)?;
    if input.username.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "username must not be empty".into(),
        )));
    }

    let code = otp::generate_code();
    let code_hash = hash_secret(&code.to_string())?;

    PendingUserRepo::upsert(&state.pool, &input.email, &input.username, &code_hash).await?;

    let message = match &state.mailer {
        Some(mailer) => {
            mailer
                .send_verification_code(&input.email, &input.username, code)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "failed to send verification email");
                    AppError::Core(CoreError::EmailDispatchFailed(e.to_string()))
                })?;
            "verification email sent"
        }
        None => {
            tracing::warn!(
                email = %input.email,
                "SMTP not configured; verification code not delivered"
            );
            "verification code recorded; email delivery is not configured"
        }
    };

    Ok(Json(RequestVerificationResponse { message }))
}

/// POST /api/v1/auth/verify/check
///
/// Compare the submitted code against the stored hash and mark the pending
/// signup as verified on a match.
pub async fn check_otp(
    State(state): State<AppState>,
    Json(input): Json<CheckOtpRequest>,
) -> AppResult<Json<CheckOtpResponse>> {
    let pending = PendingUserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound {
            entity: "pending signup",
            id: input.email.clone(),
        }))?;

    if !verify_secret(&input.code, &pending.verification_code_hash)? {
        return Err(AppError::Core(CoreError::InvalidCode));
    }

    PendingUserRepo::mark_verified(&state.pool, &input.email).await?;

    Ok(Json(CheckOtpResponse { verified: true }))
}

/// POST /api/v1/auth/signup
///
/// Promote a verified pending signup into a real user and sign them in.
/// Requires a prior successful code check; the response does not reveal
/// whether the email was unknown or merely unverified.
///
/// Marked with [`CookieRotationSuppressed`] for the same reason as login:
/// a stale refresh cookie on the request must not let the middleware
/// override the new account's cookies with another identity's.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(
    StatusCode,
    Extension<CookieRotationSuppressed>,
    HeaderMap,
    Json<AuthResponse>,
)> {
    if input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "password must not be empty".into(),
        )));
    }

    let pending = PendingUserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .filter(|p| p.is_verified)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("email not verified".into()))
        })?;

    let password_hash = hash_secret(&input.password)?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: pending.email.clone(),
            username: Some(pending.username.clone()),
            password_hash,
            is_verified: true,
        },
    )
    .await?;

    PendingUserRepo::cleanup(&state.pool, &pending.email).await?;

    // Welcome email is best effort; a delivery failure must not lose the
    // freshly created account.
    if let Some(mailer) = &state.mailer {
        if let Err(e) = mailer
            .send_welcome(&user.email, &pending.username)
            .await
        {
            tracing::error!(error = %e, "failed to send welcome email");
        }
    }

    let headers = establish_session(&state, user.id).await?;

    Ok((
        StatusCode::CREATED,
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

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_email(email: &str) -> AppResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "a valid email address is required".into(),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_email_accepts_plain_addresses() {
        assert!(validate_email("user@example.com").is_ok());
    }

    #[test]
    fn validate_email_rejects_empty_and_malformed() {
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }
}
