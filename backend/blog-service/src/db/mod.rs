/// Database access layer
///
/// This module provides:
/// - SQLite connection pooling and schema migrations
/// - Repository functions for users, groups, posts, comments and follows
pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod post_repo;
pub mod user_repo;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Open a pool against `database_url` and bring the schema up to date.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    tracing::info!(max_connections, "database pool ready");
    Ok(pool)
}

/// Single-connection in-memory database with migrations applied.
///
/// Every SQLite `:memory:` connection is its own database, so the pool is
/// pinned to exactly one connection that is never recycled.
pub async fn create_in_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Liveness probe used by the health endpoint.
pub async fn ping(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map(|_| ())
}
