//! Broadcast topics
//!
//! A topic is a named broadcast address connections subscribe to. Topics are
//! ephemeral: they exist only while at least one connection is subscribed.

use serde::{Deserialize, Serialize};

use super::Snowflake;

/// Topic name for the global feed
pub const FEED_TOPIC: &str = "feed";

/// Typed broadcast topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Global feed of new posts
    Feed,
    /// Updates to a single post
    Post(Snowflake),
    /// New top-level comments on a post
    PostComments(Snowflake),
    /// New replies under a comment
    CommentReplies(Snowflake),
    /// Per-user notification stream (all devices of one user converge here)
    UserNotifications(Snowflake),
}

impl Topic {
    /// The stable per-user topic for an identity. Deterministic: derived
    /// from the user id alone, never from the connection.
    #[must_use]
    pub fn for_identity(user_id: Snowflake) -> Self {
        Self::UserNotifications(user_id)
    }

    /// Wire name of the topic
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Feed => FEED_TOPIC.to_string(),
            Self::Post(id) => format!("post_{id}"),
            Self::PostComments(id) => format!("post_{id}_comments"),
            Self::CommentReplies(id) => format!("comment_{id}_replies"),
            Self::UserNotifications(id) => format!("user_{id}_notifications"),
        }
    }

    /// Parse a wire name back into a topic. Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name == FEED_TOPIC {
            return Some(Self::Feed);
        }

        if let Some(rest) = name.strip_prefix("post_") {
            if let Some(id_str) = rest.strip_suffix("_comments") {
                return id_str.parse::<i64>().ok().map(|id| Self::PostComments(id.into()));
            }
            return rest.parse::<i64>().ok().map(|id| Self::Post(id.into()));
        }

        if let Some(rest) = name.strip_prefix("comment_") {
            if let Some(id_str) = rest.strip_suffix("_replies") {
                return id_str.parse::<i64>().ok().map(|id| Self::CommentReplies(id.into()));
            }
        }

        if let Some(rest) = name.strip_prefix("user_") {
            if let Some(id_str) = rest.strip_suffix("_notifications") {
                return id_str
                    .parse::<i64>()
                    .ok()
                    .map(|id| Self::UserNotifications(id.into()));
            }
        }

        None
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
