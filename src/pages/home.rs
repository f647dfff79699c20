//! Landing page: newest posts, notices and the unread badge.

use std::sync::Arc;

use super::query::{apply_query, ListQuery};
use crate::config::BoardsConfig;
use crate::hooks::{posts_hook, DataHook, PostBackend};
use crate::messaging::UnreadStore;
use crate::models::Post;

pub struct HomePage {
    posts: DataHook<Vec<Post>, ()>,
    post_count: usize,
    notice_category: i64,
    unread: Option<Arc<UnreadStore>>,
}

impl HomePage {
    pub fn new(backend: Arc<dyn PostBackend>, boards: &BoardsConfig) -> Self {
        Self {
            posts: posts_hook(backend),
            post_count: boards.home_post_count,
            notice_category: boards.notice,
            unread: None,
        }
    }

    /// Show the unread badge; only set when signed in
    pub fn with_unread(mut self, store: Arc<UnreadStore>) -> Self {
        self.unread = Some(store);
        self
    }

    pub async fn load(&mut self) {
        self.posts.load().await;
    }

    pub fn error(&self) -> Option<&str> {
        self.posts.error()
    }

    fn newest(&self, posts: &[Post]) -> Vec<Post> {
        apply_query(posts, &ListQuery::new(self.post_count)).items
    }

    /// Newest posts across all boards except notices
    pub fn recent_posts(&self) -> Vec<Post> {
        let posts: Vec<Post> = self
            .posts
            .data()
            .into_iter()
            .flatten()
            .filter(|p| p.category.id != self.notice_category)
            .cloned()
            .collect();
        self.newest(&posts)
    }

    pub fn notices(&self) -> Vec<Post> {
        let posts: Vec<Post> = self
            .posts
            .data()
            .into_iter()
            .flatten()
            .filter(|p| p.category.id == self.notice_category)
            .cloned()
            .collect();
        self.newest(&posts)
    }

    pub fn unread_count(&self) -> Option<usize> {
        self.unread.as_ref().map(|store| store.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::posts::tests::{post, FakePosts};

    fn page(count: usize) -> HomePage {
        let backend = Arc::new(FakePosts::default());
        backend.rows.lock().extend([
            post(1, 1, "old", 0, 9),
            post(2, 2, "lab", 0, 3),
            post(3, 4, "notice", 0, 2),
            post(4, 1, "new", 0, 0),
            post(5, 3, "admission", 0, 1),
        ]);
        let boards = BoardsConfig {
            home_post_count: count,
            ..BoardsConfig::default()
        };
        HomePage::new(backend, &boards)
    }

    #[tokio::test]
    async fn test_recent_posts_are_newest_first_and_capped() {
        let mut home = page(3);
        home.load().await;

        let ids: Vec<i64> = home.recent_posts().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 5, 2]);
        assert_eq!(home.notices()[0].id, 3);
    }

    #[tokio::test]
    async fn test_unread_badge_only_when_signed_in() {
        let mut home = page(5);
        home.load().await;
        assert_eq!(home.unread_count(), None);

        let store = Arc::new(UnreadStore::new());
        store.set(4);
        let home = home.with_unread(store.clone());
        assert_eq!(home.unread_count(), Some(4));

        store.decrement(1);
        assert_eq!(home.unread_count(), Some(3));
    }
}
