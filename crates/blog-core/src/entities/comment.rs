//! Comment entity - attaches to a post or, recursively, to another comment

use chrono::{DateTime, Utc};

use crate::value_objects::{CommentTarget, Snowflake};

/// Comment entity. `target` is the commentable: a post for top-level
/// comments, another comment for threaded replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Snowflake,
    pub author_id: Snowflake,
    pub target: CommentTarget,
    pub body: String,
    /// Cached count of live replies
    pub comment_count: i64,
    /// Cached count of live reactions
    pub reaction_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new Comment with zeroed counters
    pub fn new(id: Snowflake, author_id: Snowflake, target: CommentTarget, body: String) -> Self {
        Self {
            id,
            author_id,
            target,
            body,
            comment_count: 0,
            reaction_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Whether this comment is a reply to another comment
    #[must_use]
    pub fn is_reply(&self) -> bool {
        matches!(self.target, CommentTarget::Comment(_))
    }
}
