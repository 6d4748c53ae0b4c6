//! Integration tests for the pending-user store.

use gatehouse_db::repositories::PendingUserRepo;
use sqlx::PgPool;

#[sqlx::test]
async fn upsert_stores_case_folded_email(pool: PgPool) {
    let row = PendingUserRepo::upsert(&pool, "User@Example.com", "alice", "hash-1")
        .await
        .expect("upsert should succeed");

    assert_eq!(row.email, "user@example.com");
    assert_eq!(row.username, "alice");
    assert!(!row.is_verified);

    // Lookup works with any casing.
    let found = PendingUserRepo::find_by_email(&pool, "USER@EXAMPLE.COM")
        .await
        .unwrap()
        .expect("row should be found case-insensitively");
    assert_eq!(found.id, row.id);
}

#[sqlx::test]
async fn repeated_request_replaces_previous_code(pool: PgPool) {
    let first = PendingUserRepo::upsert(&pool, "a@b.com", "alice", "hash-1")
        .await
        .unwrap();
    PendingUserRepo::mark_verified(&pool, "a@b.com").await.unwrap();

    // Last request wins: new hash, verification reset.
    let second = PendingUserRepo::upsert(&pool, "A@B.com", "alice2", "hash-2")
        .await
        .unwrap();

    assert_eq!(second.id, first.id, "upsert must replace, not duplicate");
    assert_eq!(second.verification_code_hash, "hash-2");
    assert_eq!(second.username, "alice2");
    assert!(!second.is_verified);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
async fn mark_verified_flips_flag(pool: PgPool) {
    PendingUserRepo::upsert(&pool, "a@b.com", "alice", "hash-1")
        .await
        .unwrap();

    PendingUserRepo::mark_verified(&pool, "A@b.COM").await.unwrap();

    let row = PendingUserRepo::find_by_email(&pool, "a@b.com")
        .await
        .unwrap()
        .unwrap();
    assert!(row.is_verified);
}

#[sqlx::test]
async fn cleanup_is_a_safe_noop_when_absent(pool: PgPool) {
    // Nothing to delete; must not error.
    PendingUserRepo::cleanup(&pool, "ghost@b.com").await.unwrap();

    PendingUserRepo::upsert(&pool, "a@b.com", "alice", "hash-1")
        .await
        .unwrap();
    PendingUserRepo::cleanup(&pool, "A@B.com").await.unwrap();

    assert!(PendingUserRepo::find_by_email(&pool, "a@b.com")
        .await
        .unwrap()
        .is_none());

    // Email is free for a fresh signup cycle.
    PendingUserRepo::upsert(&pool, "a@b.com", "alice", "hash-3")
        .await
        .unwrap();
}
