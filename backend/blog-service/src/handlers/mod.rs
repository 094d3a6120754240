/// HTTP handlers for blog endpoints
///
/// - Posts: index, group and profile feeds, post detail, create/edit/delete
/// - Comments: adding a comment to a post
/// - Follow: the followed-authors feed and follow/unfollow actions
/// - Health: liveness and database readiness
pub mod follow;
pub mod health;
pub mod posts;
pub mod urls;

use crate::error::AppError;
use crate::metrics::serve_metrics;
use actix_web::{web, HttpRequest};

/// Register every route. Unknown paths fall through to [`not_found`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .service(
            web::resource("/profile/{username}/follow/")
                .route(web::get().to(follow::profile_follow))
                .route(web::post().to(follow::profile_follow)),
        )
        .service(
            web::resource("/profile/{username}/unfollow/")
                .route(web::get().to(follow::profile_unfollow))
                .route(web::post().to(follow::profile_unfollow)),
        )
        .route("/follow/", web::get().to(follow::follow_index))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route("/posts/{post_id}/comment/", web::post().to(posts::add_comment))
        .route("/posts/{post_id}/delete/", web::post().to(posts::post_delete))
        .route("/health", web::get().to(health::health_summary))
        .route("/health/live", web::get().to(health::liveness_check))
        .route("/metrics", web::get().to(serve_metrics))
        .default_service(web::to(not_found));
}

/// Fallback for paths no route matches.
pub async fn not_found(req: HttpRequest) -> Result<actix_web::HttpResponse, AppError> {
    Err(AppError::NotFound(format!("no page at {}", req.path())))
}
