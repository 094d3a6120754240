//! Shared fixtures for blog-service integration tests.
//!
//! Each test gets its own in-memory SQLite database (migrations applied),
//! a temporary media root and a fresh index page cache.
#![allow(dead_code)]

use actix_web::http::header;
use actix_web::web;
use blog_service::cache::IndexPageCache;
use blog_service::db::{group_repo, post_repo, user_repo};
use blog_service::media::MediaStore;
use blog_service::middleware::SessionKeys;
use blog_service::models::{Group, Post, User};
use blog_service::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const LOGIN_URL: &str = "/auth/login/";

pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

const BOUNDARY: &str = "----yatube-test-boundary";

pub struct TestContext {
    pub state: AppState,
    // Keeps the media root alive for the duration of the test.
    pub media_dir: TempDir,
}

impl TestContext {
    pub fn data(&self) -> web::Data<AppState> {
        web::Data::new(self.state.clone())
    }

    pub fn auth_header(&self, user: &User) -> (header::HeaderName, String) {
        let token = self
            .state
            .sessions
            .issue(user.id, &user.username)
            .expect("issue session token");
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    pub async fn user(&self, username: &str) -> User {
        user_repo::create_user(&self.state.db, username)
            .await
            .expect("create user")
    }

    pub async fn group(&self, title: &str, slug: &str) -> Group {
        group_repo::create_group(&self.state.db, title, slug, "Тестовое описание")
            .await
            .expect("create group")
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        post_repo::insert_post(
            &self.state.db,
            author.id,
            text,
            group.map(|g| g.id),
            None,
            Utc::now(),
        )
        .await
        .expect("insert post")
    }

    pub async fn post_count(&self) -> i64 {
        post_repo::count_posts(&self.state.db, blog_service::models::FeedScope::All)
            .await
            .expect("count posts")
    }
}

pub async fn setup() -> TestContext {
    let pool = blog_service::db::create_in_memory_pool()
        .await
        .expect("in-memory database");
    let media_dir = tempfile::tempdir().expect("temp media root");

    let state = AppState::new(
        pool,
        Arc::new(IndexPageCache::new(Duration::from_secs(20))),
        MediaStore::new(media_dir.path(), "/media/"),
        SessionKeys::from_secret(b"test-session-secret"),
        LOGIN_URL,
    );

    TestContext { state, media_dir }
}

/// A file part of a multipart body: (field name, filename, bytes).
pub type FilePart<'a> = (&'a str, &'a str, &'a [u8]);

/// Encode text fields and an optional file as `multipart/form-data`.
/// Returns the content type (with boundary) and the body.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((name, filename, data)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/gif\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
