//! Pending-user model.

use gatehouse_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A signup awaiting email confirmation, from the `pending_users` table.
#[derive(Debug, Clone, FromRow)]
pub struct PendingUser {
    pub id: DbId,
    /// Stored case-folded; the unique index is on `lower(email)` regardless.
    pub email: String,
    pub username: String,
    pub is_verified: bool,
    pub verification_code_hash: String,
    pub created_at: Timestamp,
}
