//! Tag database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use blog_core::entities::Tag;
use blog_core::value_objects::Snowflake;

/// Database model for tags table
#[derive(Debug, Clone, FromRow)]
pub struct TagModel {
    pub id: i64,
    pub name: String,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<TagModel> for Tag {
    fn from(model: TagModel) -> Self {
        Tag {
            id: Snowflake::new(model.id),
            name: model.name,
            post_count: model.post_count,
            created_at: model.created_at,
        }
    }
}
