//! Domain entities - the core business objects.

mod comment;
mod follow;
mod post;
mod user;

pub use comment::Comment;
pub use follow::FollowEntry;
pub use post::Post;
pub use user::{Permission, Role, User, validate_username};
