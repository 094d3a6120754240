/// Comment service - handles comment creation and retrieval
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::forms::CommentForm;
use crate::metrics::CONTENT_WRITES_TOTAL;
use crate::middleware::SessionUser;
use crate::models::{Comment, CommentView};
use sqlx::SqlitePool;

pub struct CommentService {
    pool: SqlitePool,
}

impl CommentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach a comment to a post. Any signed-in user may comment on any post.
    pub async fn create_comment(
        &self,
        post_id: i64,
        author: &SessionUser,
        form: CommentForm,
    ) -> Result<Comment> {
        if post_repo::find_post_by_id(&self.pool, post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let form = form.clean()?;
        let comment = comment_repo::insert_comment(&self.pool, post_id, author.id, &form.text).await?;

        CONTENT_WRITES_TOTAL
            .with_label_values(&["comment", "create"])
            .inc();
        tracing::info!(comment_id = comment.id, post_id, author_id = author.id, "comment created");

        Ok(comment)
    }

    /// Comments on a post, oldest first
    pub async fn comments_for(&self, post_id: i64) -> Result<Vec<CommentView>> {
        Ok(comment_repo::find_comments_by_post(&self.pool, post_id).await?)
    }
}
