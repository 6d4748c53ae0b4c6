//! Repository for the `sessions` table.

use chrono::Utc;
use gatehouse_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::Session;

/// Refresh-token lifetime. A session created or rotated now expires in 7 days.
const SESSION_LIFETIME_DAYS: i64 = 7;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, expires_at, invalid, created_at";

/// Error type for session rotation.
#[derive(Debug, thiserror::Error)]
pub enum RenewError {
    /// The rotation target is already invalid or past its expiry. No
    /// mutation was performed.
    #[error("Session is invalid or expired")]
    SessionExpiredOrInvalid,

    /// The underlying store failed. Fatal; surfaced to the caller.
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Provides lifecycle operations for refresh-token sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session for the user, expiring in 7 days.
    pub async fn create(pool: &PgPool, user_id: DbId) -> Result<Session, sqlx::Error> {
        let expires_at = Utc::now() + chrono::Duration::days(SESSION_LIFETIME_DAYS);
        let query = format!(
            "INSERT INTO sessions (user_id, expires_at)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// True iff a session matching both ids exists, is not invalidated, and
    /// has not expired.
    pub async fn is_valid(
        pool: &PgPool,
        session_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM sessions
                WHERE id = $1
                  AND user_id = $2
                  AND invalid = false
                  AND expires_at > now()
             )",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Soft-invalidate a session. Idempotent: invalidating an already-invalid
    /// or unknown session is a successful no-op.
    pub async fn invalidate(pool: &PgPool, session_id: DbId) -> Result<(), sqlx::Error> {
        tracing::debug!(%session_id, "invalidating session");
        sqlx::query("UPDATE sessions SET invalid = true WHERE id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Rotate a session: invalidate the old row and create a replacement for
    /// the same user.
    ///
    /// The invalidation is a single conditional UPDATE, so of any number of
    /// concurrent `renew` calls for one session exactly one observes a live
    /// row and wins; the rest fail with [`RenewError::SessionExpiredOrInvalid`]
    /// without touching the store. The old row is dead before the new row
    /// exists, so an abort between the two steps can strand an unused
    /// replacement session (it expires naturally) but never leaves the old
    /// lineage redeemable.
    pub async fn renew(
        pool: &PgPool,
        session_id: DbId,
        user_id: DbId,
    ) -> Result<Session, RenewError> {
        let result = sqlx::query(
            "UPDATE sessions SET invalid = true
             WHERE id = $1
               AND user_id = $2
               AND invalid = false
               AND expires_at > now()",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RenewError::SessionExpiredOrInvalid);
        }

        Ok(Self::create(pool, user_id).await?)
    }

    /// Delete expired or invalidated sessions. Returns the number of rows
    /// removed. Not part of the request path; intended for periodic cleanup.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < now() OR invalid = true")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
