/// Blog Service Library
///
/// Serves the Yatube blogging platform: authors publish posts, file them
/// under groups, comment on each other's posts and follow authors to get a
/// personalized feed.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Persisted entities and their response views
/// - `services`: Feed composition, follow graph, post and comment writes
/// - `db`: Connection pool, migrations and per-table repositories
/// - `forms`: Validation of submitted post and comment data
/// - `cache`: Time-based cache for rendered index pages
/// - `media`: Storage of uploaded post images
/// - `middleware`: Session token verification and user extractors
/// - `error`: Error types and their HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use cache::IndexPageCache;
use media::MediaStore;
use middleware::SessionKeys;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub index_cache: Arc<IndexPageCache>,
    pub media: MediaStore,
    pub sessions: SessionKeys,
    pub login_url: String,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        index_cache: Arc<IndexPageCache>,
        media: MediaStore,
        sessions: SessionKeys,
        login_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            index_cache,
            media,
            sessions,
            login_url: login_url.into(),
        }
    }
}
