use async_trait::async_trait;

use crate::domain::{BlogPost, Comment, NewAccount, NewComment, NewPost, NewUser, User};
use crate::error::RepoError;

/// Generic repository trait shared by every entity store.
///
/// `N` is the not-yet-persisted form of `T`; the store assigns the id on `create`.
#[async_trait]
pub trait BaseRepository<T, N, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// All entities in the store's natural order.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;

    /// Persist a new entity and return it with its assigned ID.
    async fn create(&self, new: N) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, NewUser, i32> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Every user whose id is in `ids`, in no particular order. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError>;

    /// Number of registered accounts.
    async fn count(&self) -> Result<u64, RepoError>;

    /// Persist a registration. The account becomes the administrator only if
    /// no administrator exists yet, decided atomically with the insert so that
    /// concurrent first registrations yield exactly one admin.
    ///
    /// A taken email is reported as `RepoError::Constraint`.
    async fn register(&self, account: NewAccount) -> Result<User, RepoError>;
}

/// Blog post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<BlogPost, NewPost, i32> {
    /// Overwrite every stored field of an existing post.
    ///
    /// Returns `RepoError::NotFound` when the post no longer exists.
    async fn update(&self, post: BlogPost) -> Result<BlogPost, RepoError>;

    /// Delete a post together with all of its comments as one unit.
    ///
    /// Returns the number of comments removed.
    async fn delete_with_comments(&self, id: i32) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, NewComment, i32> {
    /// Comments attached to a post, oldest first.
    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Comment>, RepoError>;

    async fn delete(&self, id: i32) -> Result<(), RepoError>;
}
