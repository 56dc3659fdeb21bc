//! Polymorphic association targets
//!
//! The original data model attaches comments, reactions, and notifications
//! to a dynamically resolved "able" record. Here each closed set of target
//! kinds is an explicit tagged union over (kind, id), with a string codec
//! for database storage.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Snowflake;

/// Error when decoding a (kind, id) pair from storage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetParseError {
    #[error("unknown target kind: {0}")]
    UnknownKind(String),
}

/// What a comment attaches to. A comment on a comment is a threaded reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CommentTarget {
    Post(Snowflake),
    Comment(Snowflake),
}

impl CommentTarget {
    /// Kind discriminant as stored in the database
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Post(_) => "post",
            Self::Comment(_) => "comment",
        }
    }

    /// Target record id
    #[must_use]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Post(id) | Self::Comment(id) => *id,
        }
    }

    /// Decode from a stored (kind, id) pair
    pub fn from_parts(kind: &str, id: Snowflake) -> Result<Self, TargetParseError> {
        match kind {
            "post" => Ok(Self::Post(id)),
            "comment" => Ok(Self::Comment(id)),
            other => Err(TargetParseError::UnknownKind(other.to_string())),
        }
    }
}

/// What a reaction attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReactionTarget {
    Post(Snowflake),
    Comment(Snowflake),
}

impl ReactionTarget {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Post(_) => "post",
            Self::Comment(_) => "comment",
        }
    }

    #[must_use]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Post(id) | Self::Comment(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, id: Snowflake) -> Result<Self, TargetParseError> {
        match kind {
            "post" => Ok(Self::Post(id)),
            "comment" => Ok(Self::Comment(id)),
            other => Err(TargetParseError::UnknownKind(other.to_string())),
        }
    }
}

/// What a notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NotifiableRef {
    Post(Snowflake),
    Comment(Snowflake),
    Reaction(Snowflake),
}

impl NotifiableRef {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Post(_) => "post",
            Self::Comment(_) => "comment",
            Self::Reaction(_) => "reaction",
        }
    }

    #[must_use]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Post(id) | Self::Comment(id) | Self::Reaction(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, id: Snowflake) -> Result<Self, TargetParseError> {
        match kind {
            "post" => Ok(Self::Post(id)),
            "comment" => Ok(Self::Comment(id)),
            "reaction" => Ok(Self::Reaction(id)),
            other => Err(TargetParseError::UnknownKind(other.to_string())),
        }
    }
}

impl From<CommentTarget> for NotifiableRef {
    fn from(target: CommentTarget) -> Self {
        match target {
            CommentTarget::Post(id) => Self::Post(id),
            CommentTarget::Comment(id) => Self::Comment(id),
        }
    }
}

impl From<ReactionTarget> for NotifiableRef {
    fn from(target: ReactionTarget) -> Self {
        match target {
            ReactionTarget::Post(id) => Self::Post(id),
            ReactionTarget::Comment(id) => Self::Comment(id),
        }
    }
}

impl fmt::Display for NotifiableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}
