//! Post database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use blog_core::entities::Post;
use blog_core::value_objects::Snowflake;

/// Database model for posts table
#[derive(Debug, Clone, FromRow)]
pub struct PostModel {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub comment_count: i64,
    pub reaction_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: Snowflake::new(model.id),
            author_id: Snowflake::new(model.author_id),
            title: model.title,
            body: model.body,
            comment_count: model.comment_count,
            reaction_count: model.reaction_count,
            created_at: model.created_at,
        }
    }
}
