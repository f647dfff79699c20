//! Comment list for one post, with create/edit/delete.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::fetch::DataHook;
use super::optimistic::optimistic;
use crate::auth::validation::validate_comment;
use crate::error::ApiResult;
use crate::models::{Comment, NewComment};

#[async_trait]
pub trait CommentBackend: Send + Sync {
    async fn list_comments(&self, post_id: i64) -> ApiResult<Vec<Comment>>;
    async fn create_comment(&self, post_id: i64, comment: &NewComment) -> ApiResult<Comment>;
    async fn update_comment(&self, post_id: i64, comment_id: i64, content: &str)
        -> ApiResult<Comment>;
    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> ApiResult<()>;
}

/// Comments of one post; changing the post refetches
pub fn comments_hook(backend: Arc<dyn CommentBackend>, post_id: i64) -> DataHook<Vec<Comment>, i64> {
    DataHook::new(post_id, move |post_id| {
        let backend = backend.clone();
        async move { backend.list_comments(post_id).await }
    })
}

/// Flat comment list as returned by the server; see
/// [`crate::pages::comment_tree`] for the parent/child view
pub struct CommentSection {
    backend: Arc<dyn CommentBackend>,
    hook: DataHook<Vec<Comment>, i64>,
}

impl CommentSection {
    pub fn new(backend: Arc<dyn CommentBackend>, post_id: i64) -> Self {
        Self {
            hook: comments_hook(backend.clone(), post_id),
            backend,
        }
    }

    pub fn post_id(&self) -> i64 {
        *self.hook.deps()
    }

    pub fn comments(&self) -> &[Comment] {
        self.hook.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self) -> usize {
        self.comments().len()
    }

    pub fn error(&self) -> Option<&str> {
        self.hook.error()
    }

    pub async fn load(&mut self) {
        self.hook.load().await;
    }

    /// Switch to another post's comments
    pub async fn show_post(&mut self, post_id: i64) {
        self.hook.set_deps(post_id).await;
    }

    pub async fn add(&mut self, content: &str, parent_id: Option<i64>) -> ApiResult<Comment> {
        validate_comment(content)?;
        let post_id = self.post_id();
        let request = NewComment {
            content: content.trim().to_string(),
            parent_id,
        };

        let created = self.backend.create_comment(post_id, &request).await?;
        info!(post_id, comment_id = created.id, "Comment added");
        // Refetch so server-side ordering and nicknames are authoritative
        self.hook.refetch().await;
        Ok(created)
    }

    pub async fn edit(&mut self, comment_id: i64, content: &str) -> ApiResult<Comment> {
        validate_comment(content)?;
        let updated = self
            .backend
            .update_comment(self.post_id(), comment_id, content.trim())
            .await?;

        if let Some(comments) = self.hook.data_mut() {
            if let Some(existing) = comments.iter_mut().find(|c| c.id == comment_id) {
                *existing = updated.clone();
            }
        }
        Ok(updated)
    }

    /// Remove locally first; restored if the server refuses
    pub async fn remove(&mut self, comment_id: i64) -> ApiResult<()> {
        let post_id = self.post_id();
        let backend = self.backend.clone();

        let Some(comments) = self.hook.data_mut() else {
            return backend.delete_comment(post_id, comment_id).await;
        };

        optimistic(
            comments,
            |list| list.retain(|c| c.id != comment_id),
            || async move { backend.delete_comment(post_id, comment_id).await },
        )
        .await?;

        info!(post_id, comment_id, "Comment deleted");
        Ok(())
    }
}
