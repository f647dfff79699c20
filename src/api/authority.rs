//! Message-send authority (quota) endpoints.

use async_trait::async_trait;
use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ApiResult;
use crate::models::{MessageAuthority, User};
use crate::pages::AdminBackend;

impl ApiClient {
    pub async fn get_authority(&self, user_id: i64) -> ApiResult<MessageAuthority> {
        self.get_item(&format!("/api/message-auth/{}", user_id), Access::Required)
            .await
    }

    /// Every user's remaining quota (admin)
    pub async fn list_authorities(&self) -> ApiResult<Vec<MessageAuthority>> {
        self.get_list("/api/message-auth", Access::Required).await
    }

    /// Set a user's remaining quota (admin)
    pub async fn grant_authority(&self, user_id: i64, count: u32) -> ApiResult<MessageAuthority> {
        let body = MessageAuthority { user_id, count };
        self.send_json(Method::POST, "/api/message-auth", &body, Access::Required)
            .await
    }
}

#[async_trait]
impl AdminBackend for ApiClient {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        ApiClient::list_users(self).await
    }

    async fn list_authorities(&self) -> ApiResult<Vec<MessageAuthority>> {
        ApiClient::list_authorities(self).await
    }

    async fn grant_authority(&self, user_id: i64, count: u32) -> ApiResult<MessageAuthority> {
        ApiClient::grant_authority(self, user_id, count).await
    }
}
