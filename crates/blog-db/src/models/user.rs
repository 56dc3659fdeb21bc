//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use blog_core::entities::User;
use blog_core::value_objects::Snowflake;

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            email: model.email,
            created_at: model.created_at,
        }
    }
}
