//! Gateway frame format
//!
//! Every client frame addresses one of the three channels. Commands carry
//! their payload under `data`; server broadcasts carry a per-connection
//! sequence number so clients can detect gaps.

use blog_core::events::StreamEvent;
use blog_core::value_objects::Snowflake;
use serde::{Deserialize, Serialize};

/// The three subscribable channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Global feed of new posts
    Feed,
    /// Comment threads under posts and comments
    Thread,
    /// Per-user notification stream
    Notification,
}

impl ChannelKind {
    /// Wire name of the channel
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Thread => "thread",
            Self::Notification => "notification",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A channel-scoped client command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message", content = "data", rename_all = "snake_case")]
pub enum ChannelCommand {
    FollowPost { post_id: Snowflake },
    UnfollowPost { post_id: Snowflake },
    FollowComment { comment_id: Snowflake },
    UnfollowComment { comment_id: Snowflake },
    MarkRead { notification_id: Snowflake },
    MarkAllRead,
}

/// Frames sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Join a channel
    Subscribe { channel: ChannelKind },
    /// Leave a channel and every topic joined through it
    Unsubscribe { channel: ChannelKind },
    /// A command addressed to a subscribed channel
    Message {
        channel: ChannelKind,
        #[serde(flatten)]
        command: ChannelCommand,
    },
}

impl ClientFrame {
    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frames sent by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Sent once after the handshake
    Welcome {
        session_id: String,
        user_id: Option<Snowflake>,
    },
    /// Channel subscription succeeded
    Subscribed { channel: ChannelKind },
    /// Channel unsubscription acknowledged
    Unsubscribed { channel: ChannelKind },
    /// Channel subscription refused (distinct from not being subscribed)
    SubscribeRejected {
        channel: ChannelKind,
        reason: String,
    },
    /// A topic broadcast
    Event {
        topic: String,
        seq: u64,
        event: StreamEvent,
    },
    /// A command failed
    Error { code: String, message: String },
}

impl ServerFrame {
    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
