use chrono::Utc;
use sqlx::SqlitePool;

/// Insert a follow edge; returns true if a new row was inserted.
pub async fn insert_follow(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO follows (user_id, author_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, author_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a follow edge; returns true if a row was removed.
pub async fn delete_follow(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Served by the UNIQUE (user_id, author_id) index.
pub async fn follow_exists(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?)",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    Ok(found != 0)
}

pub async fn count_follows(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM follows WHERE user_id = ? AND author_id = ?",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
}
