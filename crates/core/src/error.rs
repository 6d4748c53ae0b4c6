//! Domain-level error taxonomy.
//!
//! Expected negative outcomes (`InvalidToken`, `SessionExpiredOrInvalid`,
//! `InvalidCode`, ...) are distinct variants so callers branch on them
//! explicitly instead of catching broad failures. The HTTP layer decides how
//! much of the distinction is allowed to reach a client.

use thiserror::Error;

/// Domain errors produced by the auth core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A token failed verification. Bad signature, expired, malformed, or
    /// wrong kind -- deliberately collapsed into one variant so no caller can
    /// build an oracle distinguishing tampering from expiry.
    #[error("Invalid token")]
    InvalidToken,

    /// A rotation targeted a session that is invalid or past its expiry.
    #[error("Session is invalid or expired")]
    SessionExpiredOrInvalid,

    /// Terminal rejection of a protected request.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A verification code did not match the stored hash.
    #[error("Invalid verification code")]
    InvalidCode,

    /// Outbound email could not be delivered. Non-fatal to persistence; the
    /// caller may retry.
    #[error("Email dispatch failed: {0}")]
    EmailDispatchFailed(String),

    /// Request input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A uniqueness or state conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
