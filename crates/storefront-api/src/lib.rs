pub mod action;
pub mod auth;
pub mod comments;
pub mod envelope;
pub mod error;
pub mod password;
pub mod token;

pub use auth::AuthHandler;
pub use comments::CommentHandler;
pub use error::ApiError;
