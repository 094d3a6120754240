use crate::db;
use crate::AppState;
use actix_web::{web, HttpResponse};

pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    match db::ping(&state.db).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("Database connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
