//! Session model.

use gatehouse_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `sessions` table.
///
/// A session is usable iff `invalid` is false and `expires_at` is in the
/// future. `invalid` is monotonic: once true it is never reset.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub invalid: bool,
    pub created_at: Timestamp,
}
