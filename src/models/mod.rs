//! Wire models for the Findora backend.

pub mod common;
pub mod message;
pub mod post;
pub mod user;

pub use common::parse_timestamp;
pub use message::{Message, MessageAuthority, MessageThread, NewMessage};
pub use post::{
    Bookmark, Category, Comment, CommentUpdate, LikeState, NewComment, NewPost, Post, PostImage,
    PostUpdate,
};
pub use user::{
    AvailabilityResponse, EmailCodeRequest, EmailVerifyRequest, LoginRequest, RefreshRequest,
    RegisterRequest, Role, TokenResponse, User, UserRef,
};
