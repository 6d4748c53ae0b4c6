//! Repository for the `pending_users` table.

use sqlx::PgPool;

use crate::models::pending_user::PendingUser;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, username, is_verified, verification_code_hash, created_at";

/// Provides lifecycle operations for unverified signups.
pub struct PendingUserRepo;

impl PendingUserRepo {
    /// Insert or replace the pending signup for an email (case-folded).
    ///
    /// Last request wins: a repeated request for the same email replaces the
    /// username and code hash and resets `is_verified`, so any code from an
    /// earlier email stops working.
    pub async fn upsert(
        pool: &PgPool,
        email: &str,
        username: &str,
        verification_code_hash: &str,
    ) -> Result<PendingUser, sqlx::Error> {
        let query = format!(
            "INSERT INTO pending_users (email, username, verification_code_hash)
             VALUES (lower($1), $2, $3)
             ON CONFLICT ((lower(email))) DO UPDATE SET
                username = EXCLUDED.username,
                verification_code_hash = EXCLUDED.verification_code_hash,
                is_verified = false,
                created_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PendingUser>(&query)
            .bind(email)
            .bind(username)
            .bind(verification_code_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a pending signup by email, case-insensitively.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<PendingUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pending_users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, PendingUser>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Mark a pending signup as email-verified.
    pub async fn mark_verified(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE pending_users SET is_verified = true WHERE lower(email) = lower($1)")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete the pending signup for an email, freeing it for a fresh cycle.
    /// Deleting a non-existent row is a successful no-op (cleanup runs with
    /// at-least-once semantics).
    pub async fn cleanup(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM pending_users WHERE lower(email) = lower($1)")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(())
    }
}
