use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::structs::User;

const USER_COLUMNS: &str = "id, email, pwd_hash, company_id, reset_token, reset_expires";

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_reset_token(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE reset_token = $1", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(token)
        .fetch_optional(pool)
        .await
}

pub async fn set_reset_token(
    pool: &SqlitePool,
    id: i64,
    token: &str,
    expires: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET reset_token = $1, reset_expires = $2 WHERE id = $3")
        .bind(token)
        .bind(expires)
        .bind(id)
        .execute(pool)
        .await?;
    log::info!("Reset token issued for user {}", id);
    Ok(())
}

/// Stores a new hash and clears any pending reset token.
pub async fn update_password(pool: &SqlitePool, id: i64, pwd_hash: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET pwd_hash = $1, reset_token = NULL, reset_expires = NULL WHERE id = $2",
    )
    .bind(pwd_hash)
    .bind(id)
    .execute(pool)
    .await?;
    log::info!("Password updated for user {}", id);
    Ok(result.rows_affected())
}

/// Spends a reset token: the update only matches while the token is still
/// on the row, so one token changes the password at most once.
pub async fn redeem_reset_token(
    pool: &SqlitePool,
    id: i64,
    token: &str,
    pwd_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET pwd_hash = $1, reset_token = NULL, reset_expires = NULL WHERE id = $2 AND reset_token = $3",
    )
    .bind(pwd_hash)
    .bind(id)
    .bind(token)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    log::info!("User with id {} deleted", id);
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;
    use chrono::Duration;

    #[actix_web::test]
    async fn reset_token_round_trip_and_clear() {
        let pool = test_support::pool().await;
        test_support::company(&pool, "tok").await;
        let user = get_user_by_email(&pool, "user-tok@example.com")
            .await
            .unwrap()
            .unwrap();

        let expires = Utc::now() + Duration::minutes(60);
        set_reset_token(&pool, user.id, "abc123", expires).await.unwrap();
        let found = get_user_by_reset_token(&pool, "abc123").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(
            found.reset_expires.map(|e| e.timestamp()),
            Some(expires.timestamp())
        );

        update_password(&pool, user.id, "new-hash").await.unwrap();
        assert!(get_user_by_reset_token(&pool, "abc123").await.unwrap().is_none());
        let user = get_user_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(user.pwd_hash, "new-hash");
        assert!(user.reset_expires.is_none());
    }

    #[actix_web::test]
    async fn reset_token_is_spent_once() {
        let pool = test_support::pool().await;
        test_support::company(&pool, "once").await;
        let user = get_user_by_email(&pool, "user-once@example.com")
            .await
            .unwrap()
            .unwrap();
        set_reset_token(&pool, user.id, "tok-once", Utc::now() + Duration::minutes(5))
            .await
            .unwrap();

        assert!(redeem_reset_token(&pool, user.id, "tok-once", "first").await.unwrap());
        assert!(!redeem_reset_token(&pool, user.id, "tok-once", "second").await.unwrap());
        assert!(!redeem_reset_token(&pool, user.id, "other", "third").await.unwrap());

        let user = get_user_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(user.pwd_hash, "first");
        assert!(user.reset_token.is_none());
    }
}
