//! User entity

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// User entity. Only the fields the realtime subsystem reads; profile data
/// lives with the out-of-scope CRUD layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User
    pub fn new(id: Snowflake, username: String, email: String) -> Self {
        Self {
            id,
            username,
            email,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive display-name comparison, used by mention resolution
    #[must_use]
    pub fn username_matches(&self, candidate: &str) -> bool {
        self.username.eq_ignore_ascii_case(candidate)
    }
}
