/// Error types for Blog Service
///
/// Every failure a handler can hit is one of these variants. Conversion to
/// an HTTP response lives here so handlers can simply `?` their way out:
/// validation problems become 400s carrying field messages, missing records
/// become the 404 page, and the two recoverable authorization cases become
/// redirects rather than error statuses.
use crate::forms::FormErrors;
use crate::handlers::urls;
use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Media storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(FormErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Anonymous access to an auth-only page; `location` is the login URL
    /// with the original target in `next`.
    #[error("Login required")]
    LoginRequired { location: String },

    /// Mutation attempted by someone other than the post's author.
    #[error("Post {post_id} can only be changed by its author")]
    NotAuthor { post_id: i64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn redirect_location(&self) -> Option<String> {
        match self {
            AppError::LoginRequired { location } => Some(location.clone()),
            AppError::NotAuthor { post_id } => Some(urls::post_detail(*post_id)),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginRequired { .. } | AppError::NotAuthor { .. } => StatusCode::FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if let Some(location) = self.redirect_location() {
            return HttpResponse::build(status)
                .insert_header((header::LOCATION, location))
                .finish();
        }

        match self {
            AppError::NotFound(detail) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Page not found",
                "detail": detail,
                "status": status.as_u16(),
            })),
            AppError::Validation(errors) => HttpResponse::BadRequest().json(serde_json::json!({
                "errors": errors,
                "status": status.as_u16(),
            })),
            _ => {
                if status.is_server_error() {
                    tracing::error!(error = %self, "request failed");
                }
                HttpResponse::build(status).json(serde_json::json!({
                    "error": self.to_string(),
                    "status": status.as_u16(),
                }))
            }
        }
    }
}

impl From<FormErrors> for AppError {
    fn from(errors: FormErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
