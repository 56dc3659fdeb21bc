//! Comment rows and thread counters.
//!
//! Comment writes run in a transaction that also adjusts the denormalized
//! comment counter on the parent row, so readers never observe the insert
//! and the increment separately.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use blog_core::entities::Comment;
use blog_core::traits::{CommentRepository, RepoResult};
use blog_core::value_objects::{CommentTarget, Snowflake};

use crate::models::CommentModel;

use super::error::{comment_not_found, map_db_error};

/// `CommentRepository` backed by PostgreSQL
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn counter_table(target: &CommentTarget) -> &'static str {
    match target {
        CommentTarget::Post(_) => "posts",
        CommentTarget::Comment(_) => "comments",
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>> {
        let result = sqlx::query_as::<_, CommentModel>(
            r"
            SELECT id, author_id, target_kind, target_id, body,
                   comment_count, reaction_count, created_at
            FROM comments
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Comment::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_target(&self, target: CommentTarget, limit: i64) -> RepoResult<Vec<Comment>> {
        let limit = limit.clamp(1, 100);

        let results = sqlx::query_as::<_, CommentModel>(
            r"
            SELECT id, author_id, target_kind, target_id, body,
                   comment_count, reaction_count, created_at
            FROM comments
            WHERE target_kind = $1 AND target_id = $2
            ORDER BY id
            LIMIT $3
            ",
        )
        .bind(target.kind())
        .bind(target.id().into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Comment::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO comments (id, author_id, target_kind, target_id, body,
                                  comment_count, reaction_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(comment.id.into_inner())
        .bind(comment.author_id.into_inner())
        .bind(comment.target.kind())
        .bind(comment.target.id().into_inner())
        .bind(&comment.body)
        .bind(comment.comment_count)
        .bind(comment.reaction_count)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let bump = format!(
            "UPDATE {} SET comment_count = comment_count + 1 WHERE id = $1",
            counter_table(&comment.target)
        );
        sqlx::query(&bump)
            .bind(comment.target.id().into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let deleted = sqlx::query_as::<_, CommentModel>(
            r"
            DELETE FROM comments
            WHERE id = $1
            RETURNING id, author_id, target_kind, target_id, body,
                      comment_count, reaction_count, created_at
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(deleted) = deleted else {
            return Err(comment_not_found(id));
        };
        let target = Comment::try_from(deleted)?.target;

        let drop = format!(
            "UPDATE {} SET comment_count = comment_count - 1 WHERE id = $1",
            counter_table(&target)
        );
        sqlx::query(&drop)
            .bind(target.id().into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}
