//! User directory endpoints.

use async_trait::async_trait;

use super::{Access, ApiClient};
use crate::error::ApiResult;
use crate::messaging::UserDirectory;
use crate::models::User;

impl ApiClient {
    pub async fn get_user(&self, user_id: i64) -> ApiResult<User> {
        self.get_item(&format!("/api/users/{}", user_id), Access::Session)
            .await
    }

    /// All users; admin only on the backend
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get_list("/api/users", Access::Required).await
    }
}

#[async_trait]
impl UserDirectory for ApiClient {
    async fn nickname(&self, user_id: i64) -> ApiResult<String> {
        Ok(self.get_user(user_id).await?.nickname)
    }
}
