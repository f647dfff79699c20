//! Direct message endpoints.

use async_trait::async_trait;
use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ApiResult;
use crate::messaging::MessageBackend;
use crate::models::{Message, MessageAuthority, NewMessage};

#[async_trait]
impl MessageBackend for ApiClient {
    async fn received(&self) -> ApiResult<Vec<Message>> {
        self.get_list("/api/messages/received", Access::Required)
            .await
    }

    async fn sent(&self) -> ApiResult<Vec<Message>> {
        self.get_list("/api/messages/sent", Access::Required).await
    }

    async fn send(&self, message: &NewMessage) -> ApiResult<()> {
        self.send_unit(Method::POST, "/api/messages", Some(message), Access::Required)
            .await
    }

    async fn mark_read(&self, message_id: i64) -> ApiResult<()> {
        self.send_unit::<()>(
            Method::PUT,
            &format!("/api/messages/{}/read", message_id),
            None,
            Access::Required,
        )
        .await
    }

    async fn delete(&self, message_id: i64) -> ApiResult<()> {
        self.send_unit::<()>(
            Method::DELETE,
            &format!("/api/messages/{}", message_id),
            None,
            Access::Required,
        )
        .await
    }

    async fn authority(&self, user_id: i64) -> ApiResult<MessageAuthority> {
        self.get_authority(user_id).await
    }
}
