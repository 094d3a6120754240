use crate::models::User;
use chrono::Utc;
use sqlx::SqlitePool;

/// Create a user. Registration lives outside this service; this is used by
/// provisioning and tests.
pub async fn create_user(pool: &SqlitePool, username: &str) -> Result<User, sqlx::Error> {
    let id = sqlx::query("INSERT INTO users (username, created_at) VALUES (?, ?)")
        .bind(username)
        .bind(Utc::now())
        .execute(pool)
        .await?
        .last_insert_rowid();

    find_user_by_id(pool, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, username, created_at FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, username, created_at FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}
