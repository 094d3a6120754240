use actix_web::{web, App, HttpServer};
use blog_service::cache::IndexPageCache;
use blog_service::media::MediaStore;
use blog_service::middleware::SessionKeys;
use blog_service::{db, handlers, AppState, Config};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Blog Service
///
/// Serves the Yatube blog: feeds (index, group, profile, followed
/// authors), post pages, the post and comment forms, and follow actions.
///
/// # Routes
///
/// - `/`, `/group/{slug}/`, `/profile/{username}/`, `/follow/` - feeds
/// - `/posts/{id}/` - post detail with comments
/// - `/create/`, `/posts/{id}/edit/`, `/posts/{id}/delete/` - post writes
/// - `/posts/{id}/comment/` - add a comment
/// - `/profile/{username}/follow/`, `/profile/{username}/unfollow/`
/// - `/health`, `/health/live`, `/metrics`
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = match db::create_pool(&config.database.url, config.database.max_connections).await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(
        db_pool,
        Arc::new(IndexPageCache::new(Duration::from_secs(
            config.cache.index_ttl_secs,
        ))),
        MediaStore::new(&config.media.root, config.media.url.clone()),
        SessionKeys::from_secret(config.auth.session_secret.as_bytes()),
        config.auth.login_url.clone(),
    );

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
