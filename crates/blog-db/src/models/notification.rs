//! Notification database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use blog_core::entities::{Notification, NotificationKind};
use blog_core::error::DomainError;
use blog_core::value_objects::{NotifiableRef, Snowflake};

/// Database model for notifications table
#[derive(Debug, Clone, FromRow)]
pub struct NotificationModel {
    pub id: i64,
    pub recipient_id: i64,
    pub actor_id: i64,
    pub notifiable_kind: String,
    pub notifiable_id: i64,
    pub kind: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationModel> for Notification {
    type Error = DomainError;

    fn try_from(model: NotificationModel) -> Result<Self, Self::Error> {
        let notifiable =
            NotifiableRef::from_parts(&model.notifiable_kind, Snowflake::new(model.notifiable_id))
                .map_err(|e| DomainError::UnknownTargetKind(e.to_string()))?;
        let kind = NotificationKind::parse(&model.kind)
            .ok_or_else(|| DomainError::InternalError(format!("unknown notification kind: {}", model.kind)))?;

        Ok(Notification {
            id: Snowflake::new(model.id),
            recipient_id: Snowflake::new(model.recipient_id),
            actor_id: Snowflake::new(model.actor_id),
            notifiable,
            kind,
            read_at: model.read_at,
            created_at: model.created_at,
        })
    }
}
