/// Session handling for blog-service
///
/// Login itself happens elsewhere; this service only verifies the signed
/// session token the login flow hands out. The token is read from the
/// `session` cookie or an `Authorization: Bearer` header.
///
/// A token only counts while its user still exists; a token for a removed
/// account is treated as no token at all.
///
/// Handlers pick their access level through extractors:
/// - [`CurrentUser`] for pages anyone can see (identity is optional)
/// - [`AuthUser`] for auth-only pages; anonymous callers are redirected to
///   the login page with the original path in `next`
use crate::db::user_repo;
use crate::error::AppError;
use crate::handlers::urls;
use crate::AppState;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";

const SESSION_TTL_DAYS: i64 = 14;
const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity of the caller after token verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

/// Signing and verification keys for session tokens
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a session token for a user.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        };

        encode(&Header::new(SESSION_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Option<SessionUser> {
        let validation = Validation::new(SESSION_ALGORITHM);
        let data = match decode::<SessionClaims>(token, &self.decoding, &validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("rejected session token: {}", e);
                return None;
            }
        };

        let id = data.claims.sub.parse::<i64>().ok()?;
        Some(SessionUser {
            id,
            username: data.claims.username,
        })
    }
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn resolve_user(req: &HttpRequest) -> Result<Option<SessionUser>, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not configured".into()))?;

    let Some(claimed) = session_token(req).and_then(|token| state.sessions.verify(&token)) else {
        return Ok(None);
    };

    match user_repo::find_user_by_id(&state.db, claimed.id).await? {
        Some(user) => Ok(Some(SessionUser {
            id: user.id,
            username: user.username,
        })),
        None => {
            tracing::debug!(user_id = claimed.id, "session token for unknown user");
            Ok(None)
        }
    }
}

/// Optional identity of the caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<SessionUser>);

impl CurrentUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve_user(&req).await.map(CurrentUser) })
    }
}

/// Required identity; anonymous callers are sent to the login page.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match resolve_user(&req).await? {
                Some(user) => Ok(AuthUser(user)),
                None => {
                    let login_url = req
                        .app_data::<web::Data<AppState>>()
                        .map(|state| state.login_url.clone())
                        .unwrap_or_default();
                    let next = req
                        .uri()
                        .path_and_query()
                        .map(|pq| pq.as_str())
                        .unwrap_or_else(|| req.path());
                    Err(AppError::LoginRequired {
                        location: urls::login_redirect(&login_url, next),
                    })
                }
            }
        })
    }
}
