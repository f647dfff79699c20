//! In-memory search, sort and pagination over fetched lists.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::models::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    MostViewed,
    Title,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::MostViewed => "views",
            SortKey::Title => "title",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newest" | "latest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "views" | "most-viewed" | "popular" => Ok(SortKey::MostViewed),
            "title" => Ok(SortKey::Title),
            other => Err(format!(
                "unknown sort key '{}' (expected newest, oldest, views or title)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: SortKey,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: None,
            sort: SortKey::default(),
            page: 1,
            page_size,
        }
    }

    /// A new search term starts again from the first page
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self.page = 1;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Anything a list page can filter and order
pub trait Listable {
    fn search_fields(&self) -> Vec<&str>;
    fn created_at(&self) -> DateTime<Utc>;
    fn views(&self) -> i64;
    fn title(&self) -> &str;
}

impl Listable for Post {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str(), self.author_nickname.as_str()]
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn views(&self) -> i64 {
        self.view_count
    }

    fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

fn matches<T: Listable>(item: &T, needle: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn compare<T: Listable>(a: &T, b: &T, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Newest => b.created_at().cmp(&a.created_at()),
        SortKey::Oldest => a.created_at().cmp(&b.created_at()),
        SortKey::MostViewed => b
            .views()
            .cmp(&a.views())
            .then_with(|| b.created_at().cmp(&a.created_at())),
        SortKey::Title => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
    }
}

/// Filter, sort and slice `items`.
///
/// Search is a case-insensitive substring match. Sorting is stable. A page
/// past the end clamps to the last page; an empty result is page 1 of 1.
pub fn apply_query<T: Listable + Clone>(items: &[T], query: &ListQuery) -> Page<T> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut filtered: Vec<&T> = match &needle {
        Some(needle) => items.iter().filter(|item| matches(*item, needle)).collect(),
        None => items.iter().collect(),
    };
    filtered.sort_by(|a, b| compare(*a, *b, query.sort));

    let page_size = query.page_size.max(1);
    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);

    let items = filtered
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}
