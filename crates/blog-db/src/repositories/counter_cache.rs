//! Counter cache maintenance
//!
//! Denormalized counters drift when rows are mutated outside the
//! transactional repositories (bulk imports, manual cleanup). The
//! maintainer resets every counter from its source-of-truth rows in a
//! single UPDATE-from-subquery per table, touching only rows whose cached
//! value is wrong, which makes a repeat run a no-op.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use blog_core::traits::{CounterCacheMaintainer, CounterRecomputeReport, RepoResult};

use super::error::map_db_error;

/// `CounterCacheMaintainer` backed by PostgreSQL
#[derive(Clone)]
pub struct PgCounterCacheMaintainer {
    pool: PgPool,
}

impl PgCounterCacheMaintainer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn recompute_posts(&self) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE posts p
            SET comment_count = src.comments,
                reaction_count = src.reactions
            FROM (
                SELECT p2.id,
                       (SELECT COUNT(*) FROM comments c
                        WHERE c.target_kind = 'post' AND c.target_id = p2.id) AS comments,
                       (SELECT COUNT(*) FROM reactions r
                        WHERE r.target_kind = 'post' AND r.target_id = p2.id) AS reactions
                FROM posts p2
            ) src
            WHERE p.id = src.id
              AND (p.comment_count <> src.comments OR p.reaction_count <> src.reactions)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    async fn recompute_comments(&self) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE comments c
            SET comment_count = src.replies,
                reaction_count = src.reactions
            FROM (
                SELECT c2.id,
                       (SELECT COUNT(*) FROM comments r
                        WHERE r.target_kind = 'comment' AND r.target_id = c2.id) AS replies,
                       (SELECT COUNT(*) FROM reactions x
                        WHERE x.target_kind = 'comment' AND x.target_id = c2.id) AS reactions
                FROM comments c2
            ) src
            WHERE c.id = src.id
              AND (c.comment_count <> src.replies OR c.reaction_count <> src.reactions)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    async fn recompute_tags(&self) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE tags t
            SET post_count = src.posts
            FROM (
                SELECT t2.id,
                       (SELECT COUNT(*) FROM post_tags pt WHERE pt.tag_id = t2.id) AS posts
                FROM tags t2
            ) src
            WHERE t.id = src.id AND t.post_count <> src.posts
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CounterCacheMaintainer for PgCounterCacheMaintainer {
    #[instrument(skip(self))]
    async fn recompute_all(&self) -> RepoResult<CounterRecomputeReport> {
        let report = CounterRecomputeReport {
            posts_updated: self.recompute_posts().await?,
            comments_updated: self.recompute_comments().await?,
            tags_updated: self.recompute_tags().await?,
        };

        tracing::info!(
            posts = report.posts_updated,
            comments = report.comments_updated,
            tags = report.tags_updated,
            "Counter cache recompute finished"
        );

        Ok(report)
    }
}
