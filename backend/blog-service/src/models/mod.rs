/// Data models for blog-service
///
/// Entities mirror the relational schema one-to-one. The `*Row` types are
/// the joined shapes the feed and detail queries return, and the `*View`
/// types are what handlers serialize into response bodies.
use crate::media::MediaStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters a post shows when displayed inline.
pub const POST_DISPLAY_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub group_id: Option<i64>,
    /// Path relative to the media root, e.g. `posts/cat.gif`
    pub image: Option<String>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.text.chars().take(POST_DISPLAY_CHARS).collect();
        f.write_str(&head)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Directed edge: `user_id` follows `author_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Which posts a feed draws from, before pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Every post (index page)
    All,
    /// Posts filed under one group
    Group(i64),
    /// Posts written by one author (profile page)
    Author(i64),
    /// Posts by every author the given user follows
    Following(i64),
}

/// Post joined with its author's username and optional group.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    pub image: Option<String>,
}

impl PostRow {
    pub fn into_view(self, media: &MediaStore) -> PostView {
        let group = match (self.group_id, self.group_slug, self.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(GroupRef { id, slug, title }),
            _ => None,
        };
        let image_url = self.image.as_deref().map(|path| media.url_for(path));

        PostView {
            id: self.id,
            text: self.text,
            pub_date: self.created_at,
            author_id: self.author_id,
            author: self.author_username,
            group,
            image: self.image,
            image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
    pub image_url: Option<String>,
}

/// Comment joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_displays_first_fifteen_chars() {
        let post = Post {
            id: 1,
            text: "Тестовый пост с длинным текстом".to_string(),
            created_at: Utc::now(),
            author_id: 1,
            group_id: None,
            image: None,
        };
        assert_eq!(post.to_string(), "Тестовый пост с");
        assert_eq!(post.to_string().chars().count(), POST_DISPLAY_CHARS);
    }

    #[test]
    fn group_displays_title() {
        let group = Group {
            id: 1,
            title: "Тестовая группа".to_string(),
            slug: "test-slug".to_string(),
            description: "Тестовое описание".to_string(),
        };
        assert_eq!(group.to_string(), "Тестовая группа");
    }
}
