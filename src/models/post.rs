//! Post, comment, like and bookmark models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    pub id: i64,
    #[serde(alias = "imageUrl")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub category: Category,
    pub author_id: i64,
    pub author_nickname: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub view_count: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub images: Vec<PostImage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub category_id: i64,
    pub title: String,
    pub content: String,
}

/// Only title and content are editable
#[derive(Debug, Clone, Serialize)]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    #[serde(default)]
    pub author_nickname: Option<String>,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentUpdate {
    pub content: String,
}

/// Like state of a post or comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LikeState {
    #[serde(alias = "isLiked")]
    pub liked: bool,
    #[serde(alias = "likeCount")]
    pub count: i64,
}

impl LikeState {
    pub fn new(liked: bool, count: i64) -> Self {
        Self { liked, count }
    }

    /// Flip `liked` and move `count` by one in the matching direction
    pub fn flipped(self) -> Self {
        if self.liked {
            Self::new(false, (self.count - 1).max(0))
        } else {
            Self::new(true, self.count + 1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    pub post_id: i64,
    #[serde(default)]
    pub post_title: String,
    pub user_id: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}
