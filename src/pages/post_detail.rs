//! Post detail: the post, its comment tree, like and bookmark state.

use std::sync::Arc;
use tracing::warn;

use super::comment_tree::{build_comment_tree, CommentNode};
use crate::hooks::{
    post_detail_hook, BookmarkBackend, BookmarkToggle, CommentBackend, CommentSection, DataHook,
    LikeBackend, LikeToggle, PostBackend,
};
use crate::models::Post;

pub struct PostDetailPage {
    post: DataHook<Post, i64>,
    comments: CommentSection,
    like: LikeToggle,
    bookmark: Option<BookmarkToggle>,
}

impl PostDetailPage {
    pub fn new(
        posts: Arc<dyn PostBackend>,
        comments: Arc<dyn CommentBackend>,
        likes: Arc<dyn LikeBackend>,
        post_id: i64,
    ) -> Self {
        Self {
            post: post_detail_hook(posts, post_id),
            comments: CommentSection::new(comments, post_id),
            like: LikeToggle::for_post(likes, post_id),
            bookmark: None,
        }
    }

    /// Bookmarks need a signed-in user
    pub fn with_bookmarks(mut self, bookmarks: Arc<dyn BookmarkBackend>) -> Self {
        self.bookmark = Some(BookmarkToggle::new(bookmarks, self.post_id()));
        self
    }

    pub fn post_id(&self) -> i64 {
        *self.post.deps()
    }

    /// Fetch everything concurrently. Like and bookmark failures are logged
    /// and leave those widgets at their defaults.
    pub async fn load(&mut self) {
        let post_id = self.post_id();
        let Self {
            post,
            comments,
            like,
            bookmark,
        } = self;

        let bookmark_load = async {
            match bookmark.as_mut() {
                Some(toggle) => toggle.load().await.map(Some),
                None => Ok(None),
            }
        };
        let (_, _, like_result, bookmark_result) =
            tokio::join!(post.load(), comments.load(), like.load(), bookmark_load);

        if let Err(e) = like_result {
            warn!(post_id, "Failed to load like state: {}", e);
        }
        if let Err(e) = bookmark_result {
            warn!(post_id, "Failed to load bookmark state: {}", e);
        }
    }

    pub fn post(&self) -> Option<&Post> {
        self.post.data()
    }

    pub fn error(&self) -> Option<&str> {
        self.post.error()
    }

    pub fn comment_tree(&self) -> Vec<CommentNode> {
        build_comment_tree(self.comments.comments())
    }

    pub fn comments(&self) -> &CommentSection {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut CommentSection {
        &mut self.comments
    }

    pub fn like(&self) -> &LikeToggle {
        &self.like
    }

    pub fn like_mut(&mut self) -> &mut LikeToggle {
        &mut self.like
    }

    pub fn bookmark(&self) -> Option<&BookmarkToggle> {
        self.bookmark.as_ref()
    }

    pub fn bookmark_mut(&mut self) -> Option<&mut BookmarkToggle> {
        self.bookmark.as_mut()
    }
}
