//! Like toggles for posts and comments.
//!
//! Each [`LikeToggle`] owns its own copy of the like state; two widgets for
//! the same target fetch and toggle independently.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::optimistic::optimistic;
use crate::error::ApiResult;
use crate::models::LikeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Post(i64),
    Comment { post_id: i64, comment_id: i64 },
}

#[async_trait]
pub trait LikeBackend: Send + Sync {
    async fn like_state(&self, target: LikeTarget) -> ApiResult<LikeState>;
    /// Flip the current user's like on the server
    async fn toggle_like(&self, target: LikeTarget) -> ApiResult<()>;
}

/// What happens after a successful toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncPolicy {
    /// Refetch the like state from the server
    AfterToggle,
    /// Keep the optimistic state. Comment likes use this so that sibling
    /// comment widgets do not overwrite each other mid-toggle; concurrent
    /// toggles from other sessions are not reconciled until the next load.
    Skip,
}

pub struct LikeToggle {
    backend: Arc<dyn LikeBackend>,
    target: LikeTarget,
    policy: ResyncPolicy,
    state: LikeState,
}

impl LikeToggle {
    pub fn new(backend: Arc<dyn LikeBackend>, target: LikeTarget, policy: ResyncPolicy) -> Self {
        Self {
            backend,
            target,
            policy,
            state: LikeState::default(),
        }
    }

    pub fn for_post(backend: Arc<dyn LikeBackend>, post_id: i64) -> Self {
        Self::new(backend, LikeTarget::Post(post_id), ResyncPolicy::AfterToggle)
    }

    pub fn for_comment(backend: Arc<dyn LikeBackend>, post_id: i64, comment_id: i64) -> Self {
        Self::new(
            backend,
            LikeTarget::Comment {
                post_id,
                comment_id,
            },
            ResyncPolicy::Skip,
        )
    }

    pub fn state(&self) -> LikeState {
        self.state
    }

    pub fn is_liked(&self) -> bool {
        self.state.liked
    }

    pub fn count(&self) -> i64 {
        self.state.count
    }

    pub fn policy(&self) -> ResyncPolicy {
        self.policy
    }

    pub async fn load(&mut self) -> ApiResult<LikeState> {
        self.state = self.backend.like_state(self.target).await?;
        Ok(self.state)
    }

    /// Flip like/count immediately, then confirm with the server.
    ///
    /// On failure the pre-toggle state is restored and the error returned.
    pub async fn toggle(&mut self) -> ApiResult<LikeState> {
        let backend = self.backend.clone();
        let target = self.target;

        optimistic(
            &mut self.state,
            |state| *state = state.flipped(),
            || async move { backend.toggle_like(target).await },
        )
        .await?;

        if self.policy == ResyncPolicy::AfterToggle {
            match self.backend.like_state(self.target).await {
                Ok(server) => self.state = server,
                Err(err) => {
                    warn!(target = ?self.target, error = %err, "Like resync failed, keeping local state")
                }
            }
        }

        debug!(target = ?self.target, liked = self.state.liked, count = self.state.count, "Like toggled");
        Ok(self.state)
    }
}
