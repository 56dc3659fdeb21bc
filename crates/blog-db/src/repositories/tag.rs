//! Tag rows and usage counters.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use blog_core::entities::Tag;
use blog_core::traits::{RepoResult, TagRepository};
use blog_core::value_objects::Snowflake;

use crate::models::TagModel;

use super::error::map_db_error;

/// `TagRepository` backed by PostgreSQL
#[derive(Clone)]
pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        let result = sqlx::query_as::<_, TagModel>(
            r"
            SELECT id, name, post_count, created_at
            FROM tags
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Tag::from))
    }

    #[instrument(skip(self))]
    async fn create(&self, tag: &Tag) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO tags (id, name, post_count, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            ",
        )
        .bind(tag.id.into_inner())
        .bind(&tag.name)
        .bind(tag.post_count)
        .bind(tag.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn tag_post(&self, tag_id: Snowflake, post_id: Snowflake) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let inserted = sqlx::query(
            r"
            INSERT INTO post_tags (tag_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (tag_id, post_id) DO NOTHING
            ",
        )
        .bind(tag_id.into_inner())
        .bind(post_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let attached = inserted.rows_affected() > 0;
        if attached {
            sqlx::query(
                r"
                UPDATE tags SET post_count = post_count + 1 WHERE id = $1
                ",
            )
            .bind(tag_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(attached)
    }

    #[instrument(skip(self))]
    async fn untag_post(&self, tag_id: Snowflake, post_id: Snowflake) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let removed = sqlx::query(
            r"
            DELETE FROM post_tags WHERE tag_id = $1 AND post_id = $2
            ",
        )
        .bind(tag_id.into_inner())
        .bind(post_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let detached = removed.rows_affected() > 0;
        if detached {
            sqlx::query(
                r"
                UPDATE tags SET post_count = post_count - 1 WHERE id = $1
                ",
            )
            .bind(tag_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(detached)
    }
}
