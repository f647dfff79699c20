//! Post list and detail hooks.

use async_trait::async_trait;
use std::sync::Arc;

use super::fetch::DataHook;
use crate::error::ApiResult;
use crate::models::Post;

#[async_trait]
pub trait PostBackend: Send + Sync {
    async fn list_posts(&self) -> ApiResult<Vec<Post>>;
    async fn list_posts_by_category(&self, category_id: i64) -> ApiResult<Vec<Post>>;
    async fn get_post(&self, post_id: i64) -> ApiResult<Post>;
}

/// Every post, across categories
pub fn posts_hook(backend: Arc<dyn PostBackend>) -> DataHook<Vec<Post>, ()> {
    DataHook::new((), move |()| {
        let backend = backend.clone();
        async move { backend.list_posts().await }
    })
}

/// Posts of one category; changing the category refetches
pub fn posts_by_category_hook(
    backend: Arc<dyn PostBackend>,
    category_id: i64,
) -> DataHook<Vec<Post>, i64> {
    DataHook::new(category_id, move |category_id| {
        let backend = backend.clone();
        async move { backend.list_posts_by_category(category_id).await }
    })
}

pub fn post_detail_hook(backend: Arc<dyn PostBackend>, post_id: i64) -> DataHook<Post, i64> {
    DataHook::new(post_id, move |post_id| {
        let backend = backend.clone();
        async move { backend.get_post(post_id).await }
    })
}
