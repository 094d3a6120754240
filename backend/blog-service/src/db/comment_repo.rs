use crate::models::{Comment, CommentView};
use chrono::Utc;
use sqlx::SqlitePool;

/// Create a new comment on a post
pub async fn insert_comment(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> Result<Comment, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO comments (post_id, author_id, text, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    sqlx::query_as::<_, Comment>(
        "SELECT id, post_id, author_id, text, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Comments on a post, oldest first
pub async fn find_comments_by_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<CommentView>, sqlx::Error> {
    sqlx::query_as::<_, CommentView>(
        r#"
        SELECT c.id, c.post_id, u.username AS author, c.text, c.created_at AS created
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ?
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}

pub async fn count_comments(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await
}
