//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Comment, Notification, Post, Reaction, ReactionKind, Tag, User};
use crate::error::DomainError;
use crate::value_objects::{CommentTarget, ReactionTarget, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by exact email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Find user by username (case-insensitive exact match)
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find the first user whose username contains the fragment
    /// (case-insensitive), ordered by ID
    async fn search_by_username_fragment(&self, fragment: &str) -> RepoResult<Option<User>>;

    /// Create a new user
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Delete a user
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find post by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>>;

    /// List posts by an author, newest first
    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>>;

    /// Create a new post
    async fn create(&self, post: &Post) -> RepoResult<()>;

    /// Delete a post
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Find comment by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>>;

    /// List comments on a target, oldest first
    async fn find_by_target(&self, target: CommentTarget, limit: i64) -> RepoResult<Vec<Comment>>;

    /// Create a comment and bump the target's comment counter in the same
    /// transaction
    async fn create(&self, comment: &Comment) -> RepoResult<()>;

    /// Delete a comment and decrement the target's comment counter in the
    /// same transaction
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Find the reaction a user placed on a target with a given kind
    async fn find(
        &self,
        user_id: Snowflake,
        target: ReactionTarget,
        kind: ReactionKind,
    ) -> RepoResult<Option<Reaction>>;

    /// List all reactions on a target
    async fn find_by_target(&self, target: ReactionTarget) -> RepoResult<Vec<Reaction>>;

    /// Create a reaction and bump the target's reaction counter in the same
    /// transaction
    async fn create(&self, reaction: &Reaction) -> RepoResult<()>;

    /// Delete a reaction and decrement the target's reaction counter in the
    /// same transaction
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Notification Repository
// ============================================================================

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Find notification by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>>;

    /// List notifications for a recipient, newest first
    async fn find_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Notification>>;

    /// Insert a notification unless one already exists for the same
    /// (recipient, notifiable, kind, actor) tuple.
    ///
    /// Returns `true` when a row was inserted, `false` when the tuple was a
    /// duplicate and the insert was skipped.
    async fn create(&self, notification: &Notification) -> RepoResult<bool>;

    /// Mark one notification read, scoped to its recipient.
    ///
    /// Returns `true` when the row transitioned from unread to read. Already
    /// read rows and rows owned by another recipient leave `false`.
    async fn mark_read(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
        read_at: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Mark every unread notification for a recipient read, returning the
    /// number of rows that transitioned
    async fn mark_all_read(
        &self,
        recipient_id: Snowflake,
        read_at: DateTime<Utc>,
    ) -> RepoResult<u64>;

    /// Count unread notifications for a recipient
    async fn unread_count(&self, recipient_id: Snowflake) -> RepoResult<i64>;
}

// ============================================================================
// Tag Repository
// ============================================================================

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Find tag by name
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>>;

    /// Create a new tag
    async fn create(&self, tag: &Tag) -> RepoResult<()>;

    /// Attach a tag to a post and bump the tag's post counter.
    ///
    /// Returns `false` when the pair already existed.
    async fn tag_post(&self, tag_id: Snowflake, post_id: Snowflake) -> RepoResult<bool>;

    /// Detach a tag from a post and decrement the tag's post counter.
    ///
    /// Returns `false` when the pair did not exist.
    async fn untag_post(&self, tag_id: Snowflake, post_id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Counter Cache Maintainer
// ============================================================================

/// How many rows each recompute pass corrected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterRecomputeReport {
    pub posts_updated: u64,
    pub comments_updated: u64,
    pub tags_updated: u64,
}

impl CounterRecomputeReport {
    /// Total rows corrected across all tables
    #[must_use]
    pub fn total(&self) -> u64 {
        self.posts_updated + self.comments_updated + self.tags_updated
    }
}

/// Recomputes every denormalized counter from its source-of-truth rows.
///
/// Idempotent: a second pass over an unchanged database corrects zero rows.
#[async_trait]
pub trait CounterCacheMaintainer: Send + Sync {
    async fn recompute_all(&self) -> RepoResult<CounterRecomputeReport>;
}
