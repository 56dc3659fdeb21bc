//! Reaction rows keyed by (user, target, kind).
//!
//! Same transactional shape as comments: the reaction row and the parent's
//! reaction counter change together or not at all.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use blog_core::entities::{Reaction, ReactionKind};
use blog_core::error::DomainError;
use blog_core::traits::{ReactionRepository, RepoResult};
use blog_core::value_objects::{ReactionTarget, Snowflake};

use crate::models::ReactionModel;

use super::error::map_db_error;

/// `ReactionRepository` backed by PostgreSQL
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn counter_table(target: &ReactionTarget) -> &'static str {
    match target {
        ReactionTarget::Post(_) => "posts",
        ReactionTarget::Comment(_) => "comments",
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        user_id: Snowflake,
        target: ReactionTarget,
        kind: ReactionKind,
    ) -> RepoResult<Option<Reaction>> {
        let result = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT id, user_id, target_kind, target_id, kind, created_at
            FROM reactions
            WHERE user_id = $1 AND target_kind = $2 AND target_id = $3 AND kind = $4
            ",
        )
        .bind(user_id.into_inner())
        .bind(target.kind())
        .bind(target.id().into_inner())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Reaction::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_target(&self, target: ReactionTarget) -> RepoResult<Vec<Reaction>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT id, user_id, target_kind, target_id, kind, created_at
            FROM reactions
            WHERE target_kind = $1 AND target_id = $2
            ORDER BY id
            ",
        )
        .bind(target.kind())
        .bind(target.id().into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Reaction::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn create(&self, reaction: &Reaction) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let inserted = sqlx::query(
            r"
            INSERT INTO reactions (id, user_id, target_kind, target_id, kind, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, target_kind, target_id, kind) DO NOTHING
            ",
        )
        .bind(reaction.id.into_inner())
        .bind(reaction.user_id.into_inner())
        .bind(reaction.target.kind())
        .bind(reaction.target.id().into_inner())
        .bind(reaction.kind.as_str())
        .bind(reaction.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Counter only moves when a row actually landed
        if inserted.rows_affected() > 0 {
            let bump = format!(
                "UPDATE {} SET reaction_count = reaction_count + 1 WHERE id = $1",
                counter_table(&reaction.target)
            );
            sqlx::query(&bump)
                .bind(reaction.target.id().into_inner())
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let deleted = sqlx::query_as::<_, ReactionModel>(
            r"
            DELETE FROM reactions
            WHERE id = $1
            RETURNING id, user_id, target_kind, target_id, kind, created_at
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(deleted) = deleted else {
            return Err(DomainError::DatabaseError(format!(
                "reaction {id} not found"
            )));
        };
        let target = Reaction::try_from(deleted)?.target;

        let drop = format!(
            "UPDATE {} SET reaction_count = reaction_count - 1 WHERE id = $1",
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
