pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod hooks;
pub mod messaging;
pub mod models;
pub mod pages;
pub mod session;

pub use api::ApiClient;
pub use auth::AuthService;
pub use config::Config;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use messaging::MessageCenter;
pub use session::SessionStore;
