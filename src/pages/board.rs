//! Category boards: free/notice boards, research-lab reviews and admissions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::query::{apply_query, ListQuery, Page, SortKey};
use crate::config::BoardsConfig;
use crate::hooks::{posts_by_category_hook, DataHook, PostBackend};
use crate::models::Post;

/// One category's posts with local search/sort/page state
pub struct BoardPage {
    hook: DataHook<Vec<Post>, i64>,
    query: ListQuery,
}

impl BoardPage {
    pub fn new(backend: Arc<dyn PostBackend>, category_id: i64, page_size: usize) -> Self {
        Self {
            hook: posts_by_category_hook(backend, category_id),
            query: ListQuery::new(page_size),
        }
    }

    pub fn category_id(&self) -> i64 {
        *self.hook.deps()
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn set_query(&mut self, query: ListQuery) {
        self.query = query;
    }

    pub fn search(&mut self, term: &str) {
        self.query = self.query.clone().with_search(term);
    }

    pub fn sort_by(&mut self, sort: SortKey) {
        self.query.sort = sort;
    }

    pub fn go_to(&mut self, page: usize) {
        self.query.page = page;
    }

    pub async fn load(&mut self) {
        self.hook.load().await;
    }

    /// Switch category; resets to the first page
    pub async fn set_category(&mut self, category_id: i64) {
        if self.hook.set_deps(category_id).await {
            self.query.page = 1;
        }
    }

    pub fn posts(&self) -> &[Post] {
        self.hook.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&str> {
        self.hook.error()
    }

    pub fn current(&self) -> Page<Post> {
        apply_query(self.posts(), &self.query)
    }
}

/// Reviews of one research lab
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabSummary {
    pub lab: String,
    pub reviews: usize,
    pub total_views: i64,
    pub latest: DateTime<Utc>,
}

fn lab_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Research-lab evaluations. Each post's title names the lab it reviews.
pub struct ResearchPage {
    board: BoardPage,
}

impl ResearchPage {
    pub fn new(backend: Arc<dyn PostBackend>, boards: &BoardsConfig) -> Self {
        Self {
            board: BoardPage::new(backend, boards.research, boards.page_size),
        }
    }

    pub fn board(&self) -> &BoardPage {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut BoardPage {
        &mut self.board
    }

    pub async fn load(&mut self) {
        self.board.load().await;
    }

    /// Labs by review count, then name
    pub fn labs(&self) -> Vec<LabSummary> {
        let mut by_lab: HashMap<String, LabSummary> = HashMap::new();
        for post in self.board.posts() {
            let summary = by_lab
                .entry(lab_key(&post.title))
                .or_insert_with(|| LabSummary {
                    lab: post.title.trim().to_string(),
                    reviews: 0,
                    total_views: 0,
                    latest: post.created_at,
                });
            summary.reviews += 1;
            summary.total_views += post.view_count;
            summary.latest = summary.latest.max(post.created_at);
        }

        let mut labs: Vec<LabSummary> = by_lab.into_values().collect();
        labs.sort_by(|a, b| {
            b.reviews
                .cmp(&a.reviews)
                .then_with(|| a.lab.to_lowercase().cmp(&b.lab.to_lowercase()))
        });
        labs
    }

    /// Every review of `lab`, newest first
    pub fn reviews_for(&self, lab: &str) -> Vec<Post> {
        let key = lab_key(lab);
        let mut reviews: Vec<Post> = self
            .board
            .posts()
            .iter()
            .filter(|p| lab_key(&p.title) == key)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }
}

pub struct AdmissionBoard {
    board: BoardPage,
}

impl AdmissionBoard {
    pub fn new(backend: Arc<dyn PostBackend>, boards: &BoardsConfig) -> Self {
        Self {
            board: BoardPage::new(backend, boards.admission, boards.page_size),
        }
    }

    pub fn board(&self) -> &BoardPage {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut BoardPage {
        &mut self.board
    }

    pub async fn load(&mut self) {
        self.board.load().await;
    }

    pub fn current(&self) -> Page<Post> {
        self.board.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::posts::tests::{post, FakePosts};

    fn backend() -> Arc<FakePosts> {
        let backend = Arc::new(FakePosts::default());
        backend.rows.lock().extend([
            post(1, 1, "Hello board", 3, 2),
            post(2, 1, "Second post", 9, 1),
            post(3, 1, "Hello again", 1, 0),
            post(10, 2, "Vision Lab", 20, 5),
            post(11, 2, "NLP Lab", 4, 3),
            post(12, 2, "vision lab ", 6, 1),
            post(20, 3, "Early admission FAQ", 50, 4),
        ]);
        backend
    }

    #[tokio::test]
    async fn test_board_search_sort_page() {
        let mut board = BoardPage::new(backend(), 1, 2);
        board.load().await;

        let page = board.current();
        assert_eq!(page.total_items, 3);
        assert_eq!(page.items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2]);

        board.search("hello");
        board.sort_by(SortKey::MostViewed);
        let page = board.current();
        assert_eq!(page.items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_switching_category_resets_page() {
        let mut board = BoardPage::new(backend(), 1, 1);
        board.load().await;
        board.go_to(3);
        assert_eq!(board.current().page, 3);

        board.set_category(2).await;
        assert_eq!(board.category_id(), 2);
        assert_eq!(board.query().page, 1);
        assert_eq!(board.current().total_items, 3);
    }

    #[tokio::test]
    async fn test_research_groups_by_lab() {
        let mut research = ResearchPage::new(backend(), &BoardsConfig::default());
        research.load().await;

        let labs = research.labs();
        assert_eq!(labs.len(), 2);
        assert_eq!(labs[0].lab, "Vision Lab");
        assert_eq!(labs[0].reviews, 2);
        assert_eq!(labs[0].total_views, 26);
        assert_eq!(labs[1].lab, "NLP Lab");

        let reviews = research.reviews_for("VISION LAB");
        assert_eq!(reviews.iter().map(|p| p.id).collect::<Vec<_>>(), vec![12, 10]);
    }

    #[tokio::test]
    async fn test_admission_board_uses_configured_category() {
        let mut admission = AdmissionBoard::new(backend(), &BoardsConfig::default());
        admission.load().await;
        assert_eq!(admission.board().category_id(), 3);
        assert_eq!(admission.current().items[0].id, 20);
    }
}
