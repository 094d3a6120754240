/// Configuration management for Blog Service
///
/// Settings come from environment variables (optionally seeded from a
/// `.env` file by the binary). Every value has a development default;
/// production refuses to start with an unset session secret.
use serde::{Deserialize, Serialize};

const DEV_SESSION_SECRET: &str = "yatube-dev-secret";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Uploaded media configuration
    pub media: MediaConfig,
    /// Index page cache configuration
    pub cache: CacheConfig,
    /// Session/auth configuration
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded files are written under
    pub root: String,
    /// Public URL prefix for stored files
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached index page
    pub index_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens
    pub session_secret: String,
    /// Where anonymous users are sent for auth-only pages
    pub login_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("BLOG_SERVICE_PORT", 8000)?,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://yatube.db?mode=rwc".to_string()),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            media: MediaConfig {
                root: std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
                url: std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string()),
            },
            cache: CacheConfig {
                index_ttl_secs: parse_env_or_default("INDEX_CACHE_TTL_SECS", 20)?,
            },
            auth: {
                let session_secret = match std::env::var("SESSION_SECRET") {
                    Ok(value) => value,
                    Err(_) if is_production => {
                        return Err("SESSION_SECRET must be set in production".to_string())
                    }
                    Err(_) => DEV_SESSION_SECRET.to_string(),
                };

                if is_production
                    && (session_secret.trim().is_empty() || session_secret == DEV_SESSION_SECRET)
                {
                    return Err(
                        "SESSION_SECRET must be set to a non-default value in production"
                            .to_string(),
                    );
                }

                AuthConfig {
                    session_secret,
                    login_url: std::env::var("LOGIN_URL")
                        .unwrap_or_else(|_| "/auth/login/".to_string()),
                }
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
