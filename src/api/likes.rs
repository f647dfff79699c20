//! Like endpoints for posts and comments.

use async_trait::async_trait;
use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ApiResult;
use crate::hooks::likes::{LikeBackend, LikeTarget};
use crate::models::LikeState;

fn likes_path(target: LikeTarget) -> String {
    match target {
        LikeTarget::Post(post_id) => format!("/api/posts/{}/likes", post_id),
        LikeTarget::Comment {
            post_id,
            comment_id,
        } => format!("/api/posts/{}/comments/{}/likes", post_id, comment_id),
    }
}

#[async_trait]
impl LikeBackend for ApiClient {
    async fn like_state(&self, target: LikeTarget) -> ApiResult<LikeState> {
        self.get_item(&likes_path(target), Access::Session).await
    }

    async fn toggle_like(&self, target: LikeTarget) -> ApiResult<()> {
        self.send_unit::<()>(Method::POST, &likes_path(target), None, Access::Required)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likes_paths() {
        assert_eq!(likes_path(LikeTarget::Post(3)), "/api/posts/3/likes");
        assert_eq!(
            likes_path(LikeTarget::Comment {
                post_id: 3,
                comment_id: 9
            }),
            "/api/posts/3/comments/9/likes"
        );
    }
}
