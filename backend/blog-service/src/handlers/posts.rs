/// Post handlers - feeds, post detail, and the post/comment forms
use crate::db::{group_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::forms::{CommentForm, FormErrors, PostForm};
use crate::handlers::urls;
use crate::middleware::{AuthUser, CurrentUser};
use crate::models::{FeedScope, Group, Post};
use crate::services::{
    page_token, CommentService, FeedService, FollowService, ImageUpload, PostService,
};
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::http::header::{self, ContentDisposition, ContentType};
use actix_web::{web, HttpResponse};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Values echoed back into a post form, with any field errors.
#[derive(Debug, Default, Serialize)]
pub struct PostFormContext {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<String>,
    pub errors: FormErrors,
}

/// Raw multipart fields of a post submission
#[derive(Debug, Default)]
pub struct PostSubmission {
    pub text: Option<String>,
    pub group: Option<String>,
    pub image: Option<ImageUpload>,
}

fn found(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Index page: all posts. The rendered body is served from the page cache.
pub async fn index(state: web::Data<AppState>, query: web::Query<PageQuery>) -> Result<HttpResponse> {
    let raw_page = query.into_inner().page;
    let key = format!("index:page={}", page_token(raw_page.as_deref()));
    let feed = FeedService::new(state.db.clone(), state.media.clone());

    let body = state
        .index_cache
        .get_or_render(&key, move || async move {
            let page = feed.compose(FeedScope::All, raw_page.as_deref()).await?;
            let body = serde_json::to_vec(&serde_json::json!({ "page_obj": page }))?;
            Ok::<_, AppError>(Bytes::from(body))
        })
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

/// Posts filed under a group
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let group = group_repo::find_group_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("group {}", slug)))?;

    let page = FeedService::new(state.db.clone(), state.media.clone())
        .compose(FeedScope::Group(group.id), query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "group": group,
        "page_obj": page,
    })))
}

/// An author's profile: their posts and whether the viewer follows them
pub async fn profile(
    state: web::Data<AppState>,
    viewer: CurrentUser,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let author = user_repo::find_user_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", username)))?;

    let page = FeedService::new(state.db.clone(), state.media.clone())
        .compose(FeedScope::Author(author.id), query.page.as_deref())
        .await?;

    let following = match viewer.id() {
        Some(viewer_id) => {
            FollowService::new(state.db.clone())
                .is_following(viewer_id, author.id)
                .await?
        }
        None => false,
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "author": { "id": author.id, "username": author.username },
        "post_count": page.count,
        "following": following,
        "page_obj": page,
    })))
}

/// A single post with its comments
pub async fn post_detail(state: web::Data<AppState>, post_id: web::Path<i64>) -> Result<HttpResponse> {
    let post = PostService::new(state.db.clone(), state.media.clone())
        .get_post(*post_id)
        .await?;
    let comments = CommentService::new(state.db.clone())
        .comments_for(post.id)
        .await?;
    let author_post_count = post_repo::count_posts_by_author(&state.db, post.author_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "post": post,
        "author_post_count": author_post_count,
        "comments": comments,
        "form": { "text": "", "errors": FormErrors::new() },
    })))
}

/// Blank post form
pub async fn post_create_form(state: web::Data<AppState>, _user: AuthUser) -> Result<HttpResponse> {
    render_post_form(&state, PostFormContext::default(), None).await
}

pub async fn post_create(
    state: web::Data<AppState>,
    user: AuthUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let submission = read_post_submission(payload).await?;
    let service = PostService::new(state.db.clone(), state.media.clone());

    let outcome = match PostForm::from_raw(submission.text.as_deref(), submission.group.as_deref()) {
        Ok(form) => service.create_post(&user.0, form, submission.image.clone()).await,
        Err(errors) => Err(errors.into()),
    };

    match outcome {
        Ok(_) => Ok(found(urls::profile(&user.0.username))),
        Err(AppError::Validation(errors)) => {
            render_invalid_post_form(&state, submission, errors, None).await
        }
        Err(e) => Err(e),
    }
}

/// Edit form pre-filled with the post; non-authors are redirected.
pub async fn post_edit_form(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let grant = PostService::new(state.db.clone(), state.media.clone())
        .authorize_edit(*post_id, &user.0)
        .await?;
    let post = grant.post();

    let context = PostFormContext {
        text: post.text.clone(),
        group: post.group_id.map(|id| id.to_string()),
        image: post.image.clone(),
        errors: FormErrors::new(),
    };
    render_post_form(&state, context, Some(post)).await
}

pub async fn post_edit(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let service = PostService::new(state.db.clone(), state.media.clone());
    let grant = service.authorize_edit(*post_id, &user.0).await?;
    let current = grant.post().clone();
    let submission = read_post_submission(payload).await?;

    let outcome = match PostForm::from_raw(submission.text.as_deref(), submission.group.as_deref()) {
        Ok(form) => service.update_post(grant, form, submission.image.clone()).await,
        Err(errors) => Err(errors.into()),
    };

    match outcome {
        Ok(post) => Ok(found(urls::post_detail(post.id))),
        Err(AppError::Validation(errors)) => {
            render_invalid_post_form(&state, submission, errors, Some(&current)).await
        }
        Err(e) => Err(e),
    }
}

/// Delete a post; only its author may do so.
pub async fn post_delete(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.db.clone(), state.media.clone());
    let grant = service.authorize_edit(*post_id, &user.0).await?;
    service.delete_post(grant).await?;

    Ok(found(urls::profile(&user.0.username)))
}

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    #[serde(default)]
    pub text: String,
}

pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<i64>,
    payload: web::Form<CommentPayload>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    let text = payload.into_inner().text;

    match CommentService::new(state.db.clone())
        .create_comment(post_id, &user.0, CommentForm::new(text.clone()))
        .await
    {
        Ok(_) => Ok(found(urls::post_detail(post_id))),
        Err(AppError::Validation(errors)) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "post_id": post_id,
            "form": { "text": text, "errors": errors },
        }))),
        Err(e) => Err(e),
    }
}

async fn render_post_form(
    state: &AppState,
    context: PostFormContext,
    post: Option<&Post>,
) -> Result<HttpResponse> {
    let body = post_form_body(state, context, post).await?;
    Ok(HttpResponse::Ok().json(body))
}

async fn render_invalid_post_form(
    state: &AppState,
    submission: PostSubmission,
    errors: FormErrors,
    post: Option<&Post>,
) -> Result<HttpResponse> {
    tracing::debug!(%errors, "post form rejected");
    let context = PostFormContext {
        text: submission.text.unwrap_or_default(),
        group: submission.group,
        image: post.and_then(|p| p.image.clone()),
        errors,
    };
    let body = post_form_body(state, context, post).await?;
    Ok(HttpResponse::BadRequest().json(body))
}

async fn post_form_body(
    state: &AppState,
    context: PostFormContext,
    post: Option<&Post>,
) -> Result<serde_json::Value> {
    let groups: Vec<Group> = group_repo::list_groups(&state.db).await?;
    Ok(serde_json::json!({
        "is_edit": post.is_some(),
        "post_id": post.map(|p| p.id),
        "form": context,
        "groups": groups,
    }))
}

/// Collect the `text`, `group` and `image` parts of a multipart body.
async fn read_post_submission(mut payload: Multipart) -> Result<PostSubmission> {
    let mut submission = PostSubmission::default();
    let mut total_bytes = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let disposition = field
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| ContentDisposition::from_raw(value).ok());
        let name = disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let filename = disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
            total_bytes += chunk.len();
            if total_bytes > MAX_UPLOAD_BYTES {
                return Err(AppError::BadRequest("upload exceeds 5MB limit".into()));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "text" => submission.text = Some(field_text(data)?),
            "group" => submission.group = Some(field_text(data)?),
            "image" => {
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !data.is_empty() {
                        submission.image = Some(ImageUpload {
                            filename,
                            data: data.freeze(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    Ok(submission)
}

fn field_text(data: BytesMut) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::BadRequest("form field is not valid UTF-8".into()))
}
