/// Follow handlers - the personalized feed and follow/unfollow actions
use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::handlers::posts::PageQuery;
use crate::handlers::urls;
use crate::middleware::AuthUser;
use crate::models::User;
use crate::services::{FeedService, FollowService};
use crate::AppState;
use actix_web::{http::header, web, HttpResponse};

async fn find_author(state: &AppState, username: &str) -> Result<User> {
    user_repo::find_user_by_username(&state.db, username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", username)))
}

/// Posts from every author the caller follows
pub async fn follow_index(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let scope = FollowService::new(state.db.clone()).feed_for(user.0.id);
    let page = FeedService::new(state.db.clone(), state.media.clone())
        .compose(scope, query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "page_obj": page })))
}

pub async fn profile_follow(
    state: web::Data<AppState>,
    user: AuthUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author = find_author(&state, &username).await?;
    FollowService::new(state.db.clone())
        .follow(user.0.id, author.id)
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, urls::profile(&author.username)))
        .finish())
}

pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: AuthUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author = find_author(&state, &username).await?;
    FollowService::new(state.db.clone())
        .unfollow(user.0.id, author.id)
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, urls::profile(&author.username)))
        .finish())
}
