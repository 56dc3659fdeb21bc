//! Post rows, tag associations, and counter updates.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use blog_core::entities::Post;
use blog_core::traits::{PostRepository, RepoResult};
use blog_core::value_objects::Snowflake;

use crate::models::PostModel;

use super::error::{map_db_error, post_not_found};

/// `PostRepository` backed by PostgreSQL
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(
            r"
            SELECT id, author_id, title, body, comment_count, reaction_count, created_at
            FROM posts
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>> {
        let limit = limit.clamp(1, 100);

        let results = sqlx::query_as::<_, PostModel>(
            r"
            SELECT id, author_id, title, body, comment_count, reaction_count, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY id DESC
            LIMIT $2
            ",
        )
        .bind(author_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, post: &Post) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO posts (id, author_id, title, body, comment_count, reaction_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(post.id.into_inner())
        .bind(post.author_id.into_inner())
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.comment_count)
        .bind(post.reaction_count)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM posts WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(post_not_found(id));
        }

        Ok(())
    }
}
