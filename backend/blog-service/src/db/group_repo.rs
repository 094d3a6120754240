use crate::models::Group;
use sqlx::SqlitePool;

/// Create a group. Groups are curated by administrators, never by the
/// request handlers.
pub async fn create_group(
    pool: &SqlitePool,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<Group, sqlx::Error> {
    let id = sqlx::query("INSERT INTO post_groups (title, slug, description) VALUES (?, ?, ?)")
        .bind(title)
        .bind(slug)
        .bind(description)
        .execute(pool)
        .await?
        .last_insert_rowid();

    find_group_by_id(pool, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_group_by_id(pool: &SqlitePool, group_id: i64) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE id = ?",
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_group_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

/// All groups, for the group choice on the post form
pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM post_groups ORDER BY title")
        .fetch_all(pool)
        .await
}
