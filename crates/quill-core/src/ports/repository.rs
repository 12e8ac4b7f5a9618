use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, FollowEntry, Post, User};
use crate::error::RepoError;
use crate::page::{Page, PageRequest};

/// Generic repository trait defining standard CRUD operations.
///
/// `insert` and `update` are separate because entities carry their own
/// generated IDs; an upsert-style save cannot tell the two apart.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Duplicate keys surface as `RepoError::Constraint`.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Update an existing entity. `RepoError::NotFound` if it does not exist.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Refresh the user's `last_seen` timestamp.
    async fn touch_last_seen(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Post repository with the listing queries the feed needs.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts, newest first.
    async fn page_recent(&self, page: PageRequest) -> Result<Page<Post>, RepoError>;

    /// Posts by one author, newest first.
    async fn page_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Posts by authors the given user follows, newest first.
    async fn page_followed(
        &self,
        follower_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, oldest first.
    async fn page_for_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepoError>;

    /// All comments, newest first, for the moderation queue.
    async fn page_all(&self, page: PageRequest) -> Result<Page<Comment>, RepoError>;

    /// Flip the disabled flag. `RepoError::NotFound` if the comment is gone.
    async fn set_disabled(&self, id: Uuid, disabled: bool) -> Result<(), RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

/// Follow repository - the relationship has a composite key and its own
/// queries, so it does not extend `BaseRepository`.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Record `follower_id` following `followed_id`.
    /// Duplicate follows surface as `RepoError::Constraint`.
    async fn insert(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), RepoError>;

    /// Remove the relationship. `RepoError::NotFound` if it did not exist.
    async fn remove(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), RepoError>;

    async fn exists(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool, RepoError>;

    /// Users following `user_id`, most recent first.
    async fn page_followers(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<FollowEntry>, RepoError>;

    /// Users `user_id` follows, most recent first.
    async fn page_following(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<FollowEntry>, RepoError>;

    async fn follower_count(&self, user_id: Uuid) -> Result<u64, RepoError>;

    async fn following_count(&self, user_id: Uuid) -> Result<u64, RepoError>;
}
