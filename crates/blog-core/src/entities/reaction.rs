//! Reaction entity - a typed reaction on a post or comment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ReactionTarget, Snowflake};

/// Reaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Love,
    Dislike,
}

impl ReactionKind {
    /// Kind discriminant as stored in the database
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Dislike => "dislike",
        }
    }

    /// Decode from storage. Unknown kinds yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(Self::Like),
            "love" => Some(Self::Love),
            "dislike" => Some(Self::Dislike),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reaction entity
///
/// At most one reaction exists per (user, target, kind) tuple; creating an
/// identical tuple again removes it instead (toggle semantics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub target: ReactionTarget,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new Reaction
    pub fn new(id: Snowflake, user_id: Snowflake, target: ReactionTarget, kind: ReactionKind) -> Self {
        Self {
            id,
            user_id,
            target,
            kind,
            created_at: Utc::now(),
        }
    }
}
