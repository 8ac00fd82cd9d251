pub mod auth_service;
pub mod blog_service;
pub mod paginator;

pub use auth_service::AuthService;
pub use blog_service::{BlogService, Submission};
