/// Post service - handles post creation, editing and deletion
///
/// Edits and deletes require an [`EditGrant`], which only
/// [`PostService::authorize_edit`] hands out and only to the post's author.
/// A caller that is not the author gets `AppError::NotAuthor`, which the
/// HTTP layer turns into a redirect to the post's page.
use crate::db::{group_repo, post_repo};
use crate::error::{AppError, Result};
use crate::forms::{FormErrors, PostForm, INVALID_CHOICE_MESSAGE, INVALID_FILENAME_MESSAGE};
use crate::media::{clean_filename, MediaStore, POST_IMAGE_DIR};
use crate::metrics::CONTENT_WRITES_TOTAL;
use crate::middleware::SessionUser;
use crate::models::{Post, PostView};
use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;

/// An uploaded image awaiting storage
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Bytes,
}

/// Proof that the holder authored the post it wraps.
#[derive(Debug)]
pub struct EditGrant {
    post: Post,
}

impl EditGrant {
    pub fn post(&self) -> &Post {
        &self.post
    }
}

pub struct PostService {
    pool: SqlitePool,
    media: MediaStore,
}

impl PostService {
    pub fn new(pool: SqlitePool, media: MediaStore) -> Self {
        Self { pool, media }
    }

    /// Get a post with author and group details
    pub async fn get_post(&self, post_id: i64) -> Result<PostView> {
        post_repo::find_post_row_by_id(&self.pool, post_id)
            .await?
            .map(|row| row.into_view(&self.media))
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    /// Create a new post authored by `author`
    pub async fn create_post(
        &self,
        author: &SessionUser,
        form: PostForm,
        image: Option<ImageUpload>,
    ) -> Result<Post> {
        let form = self.clean_form(form, image.as_ref()).await?;
        let image_path = self.store_image(image).await?;

        let inserted = post_repo::insert_post(
            &self.pool,
            author.id,
            &form.text,
            form.group,
            image_path.as_deref(),
            Utc::now(),
        )
        .await;
        let post = match inserted {
            Ok(post) => post,
            Err(e) => {
                self.discard_image(image_path.as_deref()).await;
                return Err(e.into());
            }
        };

        CONTENT_WRITES_TOTAL.with_label_values(&["post", "create"]).inc();
        tracing::info!(post_id = post.id, author_id = author.id, "post created");

        Ok(post)
    }

    /// Check that `user` may change post `post_id`.
    pub async fn authorize_edit(&self, post_id: i64, user: &SessionUser) -> Result<EditGrant> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if post.author_id != user.id {
            tracing::warn!(post_id, user_id = user.id, "edit attempt by non-author");
            return Err(AppError::NotAuthor { post_id });
        }

        Ok(EditGrant { post })
    }

    /// Apply an edit. Without a new upload the existing image is kept.
    pub async fn update_post(
        &self,
        grant: EditGrant,
        form: PostForm,
        image: Option<ImageUpload>,
    ) -> Result<Post> {
        let form = self.clean_form(form, image.as_ref()).await?;
        let new_image = self.store_image(image).await?;
        let image_path = new_image.clone().or_else(|| grant.post.image.clone());

        if let Err(e) = post_repo::update_post(
            &self.pool,
            grant.post.id,
            &form.text,
            form.group,
            image_path.as_deref(),
        )
        .await
        {
            self.discard_image(new_image.as_deref()).await;
            return Err(e.into());
        }

        CONTENT_WRITES_TOTAL.with_label_values(&["post", "update"]).inc();
        tracing::info!(post_id = grant.post.id, "post updated");

        Ok(Post {
            text: form.text,
            group_id: form.group,
            image: image_path,
            ..grant.post
        })
    }

    pub async fn delete_post(&self, grant: EditGrant) -> Result<()> {
        post_repo::delete_post(&self.pool, grant.post.id).await?;

        CONTENT_WRITES_TOTAL.with_label_values(&["post", "delete"]).inc();
        tracing::info!(post_id = grant.post.id, "post deleted");
        Ok(())
    }

    /// Field validation plus the checks that a chosen group exists and that
    /// an uploaded file has a usable name.
    async fn clean_form(&self, form: PostForm, image: Option<&ImageUpload>) -> Result<PostForm> {
        let group_known = self.group_exists(form.group).await?;
        let image_ok = image.map_or(true, |upload| clean_filename(&upload.filename).is_some());

        let (form, mut errors) = match form.clean() {
            Ok(form) => (Some(form), FormErrors::new()),
            Err(errors) => (None, errors),
        };
        if !group_known {
            errors.add("group", INVALID_CHOICE_MESSAGE);
        }
        if !image_ok {
            errors.add("image", INVALID_FILENAME_MESSAGE);
        }

        match form {
            Some(form) if errors.is_empty() => Ok(form),
            _ => Err(errors.into()),
        }
    }

    async fn group_exists(&self, group_id: Option<i64>) -> Result<bool> {
        match group_id {
            None => Ok(true),
            Some(id) => Ok(group_repo::find_group_by_id(&self.pool, id).await?.is_some()),
        }
    }

    async fn discard_image(&self, path: Option<&str>) {
        if let Some(path) = path {
            if let Err(e) = self.media.remove(path).await {
                tracing::warn!(path, error = %e, "failed to remove orphaned upload");
            }
        }
    }

    async fn store_image(&self, image: Option<ImageUpload>) -> Result<Option<String>> {
        match image {
            Some(upload) => {
                let path = self
                    .media
                    .save(POST_IMAGE_DIR, &upload.filename, &upload.data)
                    .await?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}
