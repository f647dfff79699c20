//! Bookmark endpoints.

use async_trait::async_trait;
use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ApiResult;
use crate::hooks::bookmarks::BookmarkBackend;
use crate::models::Bookmark;

#[async_trait]
impl BookmarkBackend for ApiClient {
    async fn list_bookmarks(&self) -> ApiResult<Vec<Bookmark>> {
        self.get_list("/api/posts/bookmarks", Access::Required).await
    }

    async fn add_bookmark(&self, post_id: i64) -> ApiResult<()> {
        self.send_unit::<()>(
            Method::POST,
            &format!("/api/posts/{}/bookmarks", post_id),
            None,
            Access::Required,
        )
        .await
    }

    async fn remove_bookmark(&self, post_id: i64) -> ApiResult<()> {
        self.send_unit::<()>(
            Method::DELETE,
            &format!("/api/posts/{}/bookmarks", post_id),
            None,
            Access::Required,
        )
        .await
    }
}
