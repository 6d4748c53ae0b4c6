//! User model and DTOs.

use gatehouse_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub username: Option<String>,
    /// `None` for accounts that never completed signup.
    pub password_hash: Option<String>,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
pub struct CreateUser {
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub is_verified: bool,
}
