//! Tag entity

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Tag with a denormalized count of tagged posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Snowflake,
    pub name: String,
    /// Cached count of live tagged posts
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(id: Snowflake, name: String) -> Self {
        Self {
            id,
            name,
            post_count: 0,
            created_at: Utc::now(),
        }
    }
}
