pub mod error;
pub mod form;
pub mod group;
pub mod post;
pub mod user;

pub use error::DomainError;
pub use form::{FieldErrors, PostDraft, PostForm, PostFormValues, Upload};
pub use group::Group;
pub use post::{Author, GroupRef, NewPost, Post, PostFilter};
pub use user::{Identity, User};
