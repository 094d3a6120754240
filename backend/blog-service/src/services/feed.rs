/// Feed service - turns a post scope and a requested page into a page of posts
use crate::db::post_repo;
use crate::error::Result;
use crate::media::MediaStore;
use crate::models::{FeedScope, PostView};
use crate::services::pagination::{Page, Paginator, PAGE_SIZE};
use sqlx::SqlitePool;

pub struct FeedService {
    pool: SqlitePool,
    media: MediaStore,
}

impl FeedService {
    pub fn new(pool: SqlitePool, media: MediaStore) -> Self {
        Self { pool, media }
    }

    /// One page of `scope`, newest first. Read-only.
    pub async fn compose(&self, scope: FeedScope, raw_page: Option<&str>) -> Result<Page<PostView>> {
        let count = post_repo::count_posts(&self.pool, scope).await?;
        let paginator = Paginator::new(count, PAGE_SIZE);
        let number = paginator.get_page(raw_page);
        let (offset, limit) = paginator.bounds(number);

        let rows = post_repo::fetch_posts_page(&self.pool, scope, limit, offset).await?;
        let posts = rows
            .into_iter()
            .map(|row| row.into_view(&self.media))
            .collect();

        tracing::debug!(?scope, count, page = number, "composed feed page");
        Ok(paginator.page(number, posts))
    }
}
