//! Integration tests for session lifecycle and rotation.

use assert_matches::assert_matches;
use chrono::Utc;
use gatehouse_db::models::user::{CreateUser, User};
use gatehouse_db::repositories::{RenewError, SessionRepo, UserRepo};
use sqlx::PgPool;

async fn create_test_user(pool: &PgPool, email: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        username: Some("tester".to_string()),
        password_hash: "$argon2id$fake".to_string(),
        is_verified: true,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

#[sqlx::test]
async fn create_produces_valid_session(pool: PgPool) {
    let user = create_test_user(&pool, "a@test.com").await;

    let session = SessionRepo::create(&pool, user.id)
        .await
        .expect("session creation should succeed");

    assert!(!session.invalid);
    assert!(session.expires_at > Utc::now() + chrono::Duration::days(6));
    assert!(SessionRepo::is_valid(&pool, session.id, user.id)
        .await
        .unwrap());
}

#[sqlx::test]
async fn is_valid_requires_matching_user(pool: PgPool) {
    let owner = create_test_user(&pool, "owner@test.com").await;
    let other = create_test_user(&pool, "other@test.com").await;

    let session = SessionRepo::create(&pool, owner.id).await.unwrap();

    assert!(SessionRepo::is_valid(&pool, session.id, owner.id)
        .await
        .unwrap());
    assert!(!SessionRepo::is_valid(&pool, session.id, other.id)
        .await
        .unwrap());
}

#[sqlx::test]
async fn invalidate_is_idempotent(pool: PgPool) {
    let user = create_test_user(&pool, "a@test.com").await;
    let session = SessionRepo::create(&pool, user.id).await.unwrap();

    SessionRepo::invalidate(&pool, session.id).await.unwrap();
    // Second invalidation is a no-op success.
    SessionRepo::invalidate(&pool, session.id).await.unwrap();

    assert!(!SessionRepo::is_valid(&pool, session.id, user.id)
        .await
        .unwrap());
}

#[sqlx::test]
async fn renew_invalidates_predecessor(pool: PgPool) {
    let user = create_test_user(&pool, "a@test.com").await;
    let old = SessionRepo::create(&pool, user.id).await.unwrap();

    let new = SessionRepo::renew(&pool, old.id, user.id)
        .await
        .expect("renewal of a live session should succeed");

    assert_ne!(new.id, old.id, "rotation must mint a fresh session id");
    assert!(!SessionRepo::is_valid(&pool, old.id, user.id).await.unwrap());
    assert!(SessionRepo::is_valid(&pool, new.id, user.id).await.unwrap());
}

#[sqlx::test]
async fn renew_rejects_invalidated_session(pool: PgPool) {
    let user = create_test_user(&pool, "a@test.com").await;
    let session = SessionRepo::create(&pool, user.id).await.unwrap();
    SessionRepo::invalidate(&pool, session.id).await.unwrap();

    let result = SessionRepo::renew(&pool, session.id, user.id).await;
    assert_matches!(result, Err(RenewError::SessionExpiredOrInvalid));

    // No replacement session was created.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
async fn renew_rejects_expired_session(pool: PgPool) {
    let user = create_test_user(&pool, "a@test.com").await;
    let session = SessionRepo::create(&pool, user.id).await.unwrap();

    // Force the session past its expiry.
    sqlx::query("UPDATE sessions SET expires_at = now() - interval '1 hour' WHERE id = $1")
        .bind(session.id)
        .execute(&pool)
        .await
        .unwrap();

    let result = SessionRepo::renew(&pool, session.id, user.id).await;
    assert_matches!(result, Err(RenewError::SessionExpiredOrInvalid));
}

/// Two renewals racing on the same session: the conditional UPDATE lets
/// exactly one through; the loser sees the session as dead and creates
/// nothing. Duplicate rotation would mint two live lineages from one.
#[sqlx::test]
async fn concurrent_renew_has_exactly_one_winner(pool: PgPool) {
    let user = create_test_user(&pool, "a@test.com").await;
    let session = SessionRepo::create(&pool, user.id).await.unwrap();

    let (left, right) = tokio::join!(
        SessionRepo::renew(&pool, session.id, user.id),
        SessionRepo::renew(&pool, session.id, user.id),
    );

    let winners = [&left, &right].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one concurrent renewal may succeed");

    let loser = if left.is_ok() { right } else { left };
    assert_matches!(loser, Err(RenewError::SessionExpiredOrInvalid));

    // One original (now invalid) plus one replacement.
    let live: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sessions WHERE user_id = $1 AND invalid = false",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(live, 1, "one logical rotation must leave one live session");
}

#[sqlx::test]
async fn cleanup_removes_dead_sessions_only(pool: PgPool) {
    let user = create_test_user(&pool, "a@test.com").await;
    let live = SessionRepo::create(&pool, user.id).await.unwrap();
    let dead = SessionRepo::create(&pool, user.id).await.unwrap();
    SessionRepo::invalidate(&pool, dead.id).await.unwrap();

    let removed = SessionRepo::cleanup_expired(&pool).await.unwrap();

    assert_eq!(removed, 1);
    assert!(SessionRepo::is_valid(&pool, live.id, user.id).await.unwrap());
}
