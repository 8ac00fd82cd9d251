pub mod group_repository;
pub mod post_repository;
pub mod user_repository;

pub use group_repository::{GroupRepository, PostgresGroupRepository};
pub use post_repository::{PostRepository, PostgresPostRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};
