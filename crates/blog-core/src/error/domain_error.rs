//! Errors raised by domain rules and the ports beneath them.

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Every way a domain operation can fail
#[derive(Debug, Error)]
pub enum DomainError {
    // Missing entities
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Post not found: {0}")]
    PostNotFound(Snowflake),

    #[error("Comment not found: {0}")]
    CommentNotFound(Snowflake),

    #[error("Notification not found: {0}")]
    NotificationNotFound(Snowflake),

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    // Rejected input
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown target kind: {0}")]
    UnknownTargetKind(String),

    #[error("Unknown reaction kind: {0}")]
    UnknownReactionKind(String),

    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // Caller lacks standing
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Not the notification recipient")]
    NotNotificationRecipient,

    // Wrapped infrastructure failures
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Broker error: {0}")]
    BrokerError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Stable code carried in wire responses
    pub fn code(&self) -> &'static str {
        match self {
            // Missing entities
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",
            Self::TagNotFound(_) => "UNKNOWN_TAG",

            // Rejected input
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::UnknownTargetKind(_) => "UNKNOWN_TARGET_KIND",
            Self::UnknownReactionKind(_) => "UNKNOWN_REACTION_KIND",
            Self::UnknownTopic(_) => "UNKNOWN_TOPIC",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            // Standing
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::NotNotificationRecipient => "NOT_RECIPIENT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::BrokerError(_) => "BROKER_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// True for any missing-entity variant
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::PostNotFound(_)
                | Self::CommentNotFound(_)
                | Self::NotificationNotFound(_)
                | Self::TagNotFound(_)
        )
    }

    /// True for any rejected-input variant
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::UnknownTargetKind(_)
                | Self::UnknownReactionKind(_)
                | Self::UnknownTopic(_)
                | Self::ContentTooLong { .. }
        )
    }

    /// True for any lack-of-standing variant
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationRequired | Self::NotNotificationRecipient
        )
    }
}
