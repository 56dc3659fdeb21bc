//! Comment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use blog_core::entities::Comment;
use blog_core::error::DomainError;
use blog_core::value_objects::{CommentTarget, Snowflake};

/// Database model for comments table
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: i64,
    pub author_id: i64,
    pub target_kind: String,
    pub target_id: i64,
    pub body: String,
    pub comment_count: i64,
    pub reaction_count: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CommentModel> for Comment {
    type Error = DomainError;

    fn try_from(model: CommentModel) -> Result<Self, Self::Error> {
        let target = CommentTarget::from_parts(&model.target_kind, Snowflake::new(model.target_id))
            .map_err(|e| DomainError::UnknownTargetKind(e.to_string()))?;

        Ok(Comment {
            id: Snowflake::new(model.id),
            author_id: Snowflake::new(model.author_id),
            target,
            body: model.body,
            comment_count: model.comment_count,
            reaction_count: model.reaction_count,
            created_at: model.created_at,
        })
    }
}
