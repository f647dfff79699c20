//! Post CRUD endpoints.

use async_trait::async_trait;
use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ApiResult;
use crate::hooks::posts::PostBackend;
use crate::models::{NewPost, Post, PostUpdate};

impl ApiClient {
    pub async fn list_posts(&self) -> ApiResult<Vec<Post>> {
        self.get_list("/api/posts", Access::Session).await
    }

    pub async fn list_posts_by_category(&self, category_id: i64) -> ApiResult<Vec<Post>> {
        let builder = self
            .request(Method::GET, "/api/posts", Access::Session)?
            .query(&[("categoryId", category_id)]);
        let value = self.execute_json(builder).await?;
        super::envelope::normalize_list(value)
    }

    pub async fn get_post(&self, post_id: i64) -> ApiResult<Post> {
        self.get_item(&format!("/api/posts/{}", post_id), Access::Session)
            .await
    }

    pub async fn create_post(&self, post: &NewPost) -> ApiResult<Post> {
        self.send_json(Method::POST, "/api/posts", post, Access::Required)
            .await
    }

    pub async fn update_post(&self, post_id: i64, update: &PostUpdate) -> ApiResult<Post> {
        self.send_json(
            Method::PUT,
            &format!("/api/posts/{}", post_id),
            update,
            Access::Required,
        )
        .await
    }

    pub async fn delete_post(&self, post_id: i64) -> ApiResult<()> {
        self.send_unit::<()>(
            Method::DELETE,
            &format!("/api/posts/{}", post_id),
            None,
            Access::Required,
        )
        .await
    }
}

#[async_trait]
impl PostBackend for ApiClient {
    async fn list_posts(&self) -> ApiResult<Vec<Post>> {
        ApiClient::list_posts(self).await
    }

    async fn list_posts_by_category(&self, category_id: i64) -> ApiResult<Vec<Post>> {
        ApiClient::list_posts_by_category(self, category_id).await
    }

    async fn get_post(&self, post_id: i64) -> ApiResult<Post> {
        ApiClient::get_post(self, post_id).await
    }
}
