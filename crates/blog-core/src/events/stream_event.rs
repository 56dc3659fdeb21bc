//! Stream events - the payloads broadcast over topics
//!
//! Every state change that reaches subscribers travels as a `StreamEvent`:
//! a type tag plus a JSON payload. The broker and the gateway treat the
//! payload as opaque; only the services that emit an event know its shape.

use serde::{Deserialize, Serialize};

/// Event type names carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamEventType {
    PostCreated,
    CommentCreated,
    ReactionAdded,
    ReactionRemoved,
    NotificationCreated,
    NotificationRead,
    NotificationsAllRead,
}

impl StreamEventType {
    /// Get the event type name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostCreated => "POST_CREATED",
            Self::CommentCreated => "COMMENT_CREATED",
            Self::ReactionAdded => "REACTION_ADDED",
            Self::ReactionRemoved => "REACTION_REMOVED",
            Self::NotificationCreated => "NOTIFICATION_CREATED",
            Self::NotificationRead => "NOTIFICATION_READ",
            Self::NotificationsAllRead => "NOTIFICATIONS_ALL_READ",
        }
    }
}

impl std::fmt::Display for StreamEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event wrapper for topic broadcasts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Event type name
    pub event_type: StreamEventType,
    /// Event payload
    pub data: serde_json::Value,
}

impl StreamEvent {
    /// Create a new event
    #[must_use]
    pub fn new(event_type: StreamEventType, data: serde_json::Value) -> Self {
        Self { event_type, data }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
