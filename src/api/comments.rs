//! Comment endpoints, nested under a post.

use async_trait::async_trait;
use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ApiResult;
use crate::hooks::comments::CommentBackend;
use crate::models::{Comment, CommentUpdate, NewComment};

impl ApiClient {
    pub async fn list_comments(&self, post_id: i64) -> ApiResult<Vec<Comment>> {
        self.get_list(&format!("/api/posts/{}/comments", post_id), Access::Session)
            .await
    }

    pub async fn create_comment(&self, post_id: i64, comment: &NewComment) -> ApiResult<Comment> {
        self.send_json(
            Method::POST,
            &format!("/api/posts/{}/comments", post_id),
            comment,
            Access::Required,
        )
        .await
    }

    pub async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        content: &str,
    ) -> ApiResult<Comment> {
        let body = CommentUpdate {
            content: content.to_string(),
        };
        self.send_json(
            Method::PUT,
            &format!("/api/posts/{}/comments/{}", post_id, comment_id),
            &body,
            Access::Required,
        )
        .await
    }

    pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> ApiResult<()> {
        self.send_unit::<()>(
            Method::DELETE,
            &format!("/api/posts/{}/comments/{}", post_id, comment_id),
            None,
            Access::Required,
        )
        .await
    }
}

#[async_trait]
impl CommentBackend for ApiClient {
    async fn list_comments(&self, post_id: i64) -> ApiResult<Vec<Comment>> {
        ApiClient::list_comments(self, post_id).await
    }

    async fn create_comment(&self, post_id: i64, comment: &NewComment) -> ApiResult<Comment> {
        ApiClient::create_comment(self, post_id, comment).await
    }

    async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        content: &str,
    ) -> ApiResult<Comment> {
        ApiClient::update_comment(self, post_id, comment_id, content).await
    }

    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> ApiResult<()> {
        ApiClient::delete_comment(self, post_id, comment_id).await
    }
}
