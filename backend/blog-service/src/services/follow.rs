use crate::db::follow_repo;
use crate::error::{AppError, Result};
use crate::metrics::FOLLOW_EDGES_TOTAL;
use crate::models::FeedScope;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct FollowService {
    pool: SqlitePool,
}

impl FollowService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent follow; returns true if a new edge was created.
    /// Following yourself is rejected.
    pub async fn follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        if user_id == author_id {
            return Err(AppError::InvalidInput("You cannot follow yourself".into()));
        }

        let created = follow_repo::insert_follow(&self.pool, user_id, author_id).await?;
        if created {
            FOLLOW_EDGES_TOTAL.with_label_values(&["created"]).inc();
            tracing::info!(user_id, author_id, "follow edge created");
        }
        Ok(created)
    }

    /// Idempotent unfollow; returns true if an edge was removed.
    pub async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let removed = follow_repo::delete_follow(&self.pool, user_id, author_id).await?;
        if removed {
            FOLLOW_EDGES_TOTAL.with_label_values(&["removed"]).inc();
            tracing::info!(user_id, author_id, "follow edge removed");
        }
        Ok(removed)
    }

    pub async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(follow_repo::follow_exists(&self.pool, user_id, author_id).await?)
    }

    /// Post scope of everyone `user_id` follows, for the feed composer.
    pub fn feed_for(&self, user_id: i64) -> FeedScope {
        FeedScope::Following(user_id)
    }
}
