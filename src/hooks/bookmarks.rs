//! Bookmark toggle for a single post.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::fetch::DataHook;
use super::optimistic::optimistic;
use crate::error::ApiResult;
use crate::models::Bookmark;

#[async_trait]
pub trait BookmarkBackend: Send + Sync {
    async fn list_bookmarks(&self) -> ApiResult<Vec<Bookmark>>;
    async fn add_bookmark(&self, post_id: i64) -> ApiResult<()>;
    async fn remove_bookmark(&self, post_id: i64) -> ApiResult<()>;
}

/// The signed-in user's bookmark list
pub fn bookmarks_hook(backend: Arc<dyn BookmarkBackend>) -> DataHook<Vec<Bookmark>, ()> {
    DataHook::new((), move |()| {
        let backend = backend.clone();
        async move { backend.list_bookmarks().await }
    })
}

pub struct BookmarkToggle {
    backend: Arc<dyn BookmarkBackend>,
    post_id: i64,
    bookmarked: bool,
}

impl BookmarkToggle {
    pub fn new(backend: Arc<dyn BookmarkBackend>, post_id: i64) -> Self {
        Self {
            backend,
            post_id,
            bookmarked: false,
        }
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmarked
    }

    /// Derive the flag from the user's bookmark list
    pub async fn load(&mut self) -> ApiResult<bool> {
        let bookmarks = self.backend.list_bookmarks().await?;
        self.bookmarked = bookmarks.iter().any(|b| b.post_id == self.post_id);
        Ok(self.bookmarked)
    }

    pub async fn toggle(&mut self) -> ApiResult<bool> {
        let backend = self.backend.clone();
        let post_id = self.post_id;
        let was_bookmarked = self.bookmarked;

        optimistic(
            &mut self.bookmarked,
            |flag| *flag = !*flag,
            || async move {
                if was_bookmarked {
                    backend.remove_bookmark(post_id).await
                } else {
                    backend.add_bookmark(post_id).await
                }
            },
        )
        .await?;

        debug!(post_id, bookmarked = self.bookmarked, "Bookmark toggled");
        Ok(self.bookmarked)
    }
}
