//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use blog_core::entities::{Reaction, ReactionKind};
use blog_core::error::DomainError;
use blog_core::value_objects::{ReactionTarget, Snowflake};

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub id: i64,
    pub user_id: i64,
    pub target_kind: String,
    pub target_id: i64,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        let target = ReactionTarget::from_parts(&model.target_kind, Snowflake::new(model.target_id))
            .map_err(|e| DomainError::UnknownTargetKind(e.to_string()))?;
        let kind = ReactionKind::parse(&model.kind)
            .ok_or_else(|| DomainError::UnknownReactionKind(model.kind.clone()))?;

        Ok(Reaction {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            target,
            kind,
            created_at: model.created_at,
        })
    }
}
