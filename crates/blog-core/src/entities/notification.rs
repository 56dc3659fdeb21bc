//! Notification entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{CommentTarget, NotifiableRef, ReactionTarget, Snowflake};

/// What kind of event produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CommentOnPost,
    ReplyToComment,
    ReactionOnPost,
    ReactionOnComment,
    Mention,
}

impl NotificationKind {
    /// Kind discriminant as stored in the database
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommentOnPost => "comment_on_post",
            Self::ReplyToComment => "reply_to_comment",
            Self::ReactionOnPost => "reaction_on_post",
            Self::ReactionOnComment => "reaction_on_comment",
            Self::Mention => "mention",
        }
    }

    /// Decode from storage. Unknown kinds yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "comment_on_post" => Some(Self::CommentOnPost),
            "reply_to_comment" => Some(Self::ReplyToComment),
            "reaction_on_post" => Some(Self::ReactionOnPost),
            "reaction_on_comment" => Some(Self::ReactionOnComment),
            "mention" => Some(Self::Mention),
            _ => None,
        }
    }

    /// The kind produced when a comment lands on the given target
    #[must_use]
    pub fn for_comment(target: &CommentTarget) -> Self {
        match target {
            CommentTarget::Post(_) => Self::CommentOnPost,
            CommentTarget::Comment(_) => Self::ReplyToComment,
        }
    }

    /// The kind produced when a reaction lands on the given target
    #[must_use]
    pub fn for_reaction(target: &ReactionTarget) -> Self {
        match target {
            ReactionTarget::Post(_) => Self::ReactionOnPost,
            ReactionTarget::Comment(_) => Self::ReactionOnComment,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification entity
///
/// At most one notification exists per (recipient, notifiable, kind, actor)
/// tuple. Records are never content-mutated after creation; only the read
/// state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Snowflake,
    pub recipient_id: Snowflake,
    pub actor_id: Snowflake,
    pub notifiable: NotifiableRef,
    pub kind: NotificationKind,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread Notification
    pub fn new(
        id: Snowflake,
        recipient_id: Snowflake,
        actor_id: Snowflake,
        notifiable: NotifiableRef,
        kind: NotificationKind,
    ) -> Self {
        Self {
            id,
            recipient_id,
            actor_id,
            notifiable,
            kind,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the recipient has read this notification
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// The dedup tuple this record is unique over
    #[must_use]
    pub fn dedup_key(&self) -> (Snowflake, NotifiableRef, NotificationKind, Snowflake) {
        (self.recipient_id, self.notifiable, self.kind, self.actor_id)
    }
}
