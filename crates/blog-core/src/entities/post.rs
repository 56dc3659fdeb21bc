//! Post entity

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Post entity with denormalized association counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Snowflake,
    pub author_id: Snowflake,
    pub title: String,
    pub body: String,
    /// Cached count of live comments (kept in sync by the counter cache)
    pub comment_count: i64,
    /// Cached count of live reactions
    pub reaction_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new Post with zeroed counters
    pub fn new(id: Snowflake, author_id: Snowflake, title: String, body: String) -> Self {
        Self {
            id,
            author_id,
            title,
            body,
            comment_count: 0,
            reaction_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Text scanned for mentions: title and body together
    #[must_use]
    pub fn mention_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}
