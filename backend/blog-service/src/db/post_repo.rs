use crate::models::{FeedScope, Post, PostRow};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const POST_ROW_SELECT: &str = r#"
    SELECT p.id, p.text, p.created_at, p.author_id, u.username AS author_username,
           p.group_id, g.slug AS group_slug, g.title AS group_title, p.image
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

/// WHERE clause restricting `posts p` to a feed scope, plus its bind value.
fn scope_filter(scope: FeedScope) -> (&'static str, Option<i64>) {
    match scope {
        FeedScope::All => ("", None),
        FeedScope::Group(group_id) => ("WHERE p.group_id = ?", Some(group_id)),
        FeedScope::Author(author_id) => ("WHERE p.author_id = ?", Some(author_id)),
        FeedScope::Following(user_id) => (
            "WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ?)",
            Some(user_id),
        ),
    }
}

/// Insert a post and return it
pub async fn insert_post(
    pool: &SqlitePool,
    author_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<Post, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO posts (text, created_at, author_id, group_id, image)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(text)
    .bind(created_at)
    .bind(author_id)
    .bind(group_id)
    .bind(image)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_post_by_id(pool, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Overwrite the editable fields of a post. Author and creation time are
/// never touched.
pub async fn update_post(
    pool: &SqlitePool,
    post_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET text = ?, group_id = ?, image = ?
        WHERE id = ?
        "#,
    )
    .bind(text)
    .bind(group_id)
    .bind(image)
    .bind(post_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_post(pool: &SqlitePool, post_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn find_post_by_id(pool: &SqlitePool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, text, created_at, author_id, group_id, image
        FROM posts
        WHERE id = ?
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Find a post together with author and group details
pub async fn find_post_row_by_id(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Option<PostRow>, sqlx::Error> {
    let sql = format!("{POST_ROW_SELECT} WHERE p.id = ?");
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Count the posts visible in a feed scope
pub async fn count_posts(pool: &SqlitePool, scope: FeedScope) -> Result<i64, sqlx::Error> {
    let (filter, param) = scope_filter(scope);
    let sql = format!("SELECT COUNT(*) FROM posts p {filter}");

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(value) = param {
        query = query.bind(value);
    }
    query.fetch_one(pool).await
}

/// One page of a feed scope, newest first. Posts sharing a timestamp are
/// ordered by id so page boundaries are stable.
pub async fn fetch_posts_page(
    pool: &SqlitePool,
    scope: FeedScope,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostRow>, sqlx::Error> {
    let (filter, param) = scope_filter(scope);
    let sql = format!(
        "{POST_ROW_SELECT} {filter} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
    );

    let mut query = sqlx::query_as::<_, PostRow>(&sql);
    if let Some(value) = param {
        query = query.bind(value);
    }
    query.bind(limit).bind(offset).fetch_all(pool).await
}

pub async fn count_posts_by_author(pool: &SqlitePool, author_id: i64) -> Result<i64, sqlx::Error> {
    count_posts(pool, FeedScope::Author(author_id)).await
}
