//! Page-level compositions, each gluing a few hooks together.
//!
//! Pages own their local view state (search term, sort key, page number)
//! and never share state with each other.

pub mod admin;
pub mod board;
pub mod comment_tree;
pub mod home;
pub mod post_detail;
pub mod query;

pub use admin::{AdminBackend, AdminPage, AdminRow};
pub use board::{AdmissionBoard, BoardPage, LabSummary, ResearchPage};
pub use comment_tree::{build_comment_tree, CommentNode};
pub use home::HomePage;
pub use post_detail::PostDetailPage;
pub use query::{apply_query, ListQuery, Listable, Page, SortKey};
