//! Stateful wrappers over the API: data-fetch hooks and optimistic toggles.

pub mod bookmarks;
pub mod comments;
pub mod fetch;
pub mod likes;
pub mod optimistic;
pub mod posts;

pub use bookmarks::{bookmarks_hook, BookmarkBackend, BookmarkToggle};
pub use comments::{comments_hook, CommentBackend, CommentSection};
pub use fetch::{DataHook, FetchState};
pub use likes::{LikeBackend, LikeTarget, LikeToggle, ResyncPolicy};
pub use optimistic::{optimistic, optimistic_mutation};
pub use posts::{post_detail_hook, posts_by_category_hook, posts_hook, PostBackend};
