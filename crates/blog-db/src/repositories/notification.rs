//! Notification rows with dedup-aware inserts.
//!
//! Deduplication is enforced here, at the storage layer: the notifications
//! table carries a unique index over (recipient_id, notifiable_kind,
//! notifiable_id, kind, actor_id) and inserts use ON CONFLICT DO NOTHING.
//! Concurrent duplicate attempts therefore collapse to one row no matter
//! how many service instances race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use blog_core::entities::Notification;
use blog_core::traits::{NotificationRepository, RepoResult};
use blog_core::value_objects::Snowflake;

use crate::models::NotificationModel;

use super::error::map_db_error;

/// `NotificationRepository` backed by PostgreSQL
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        let result = sqlx::query_as::<_, NotificationModel>(
            r"
            SELECT id, recipient_id, actor_id, notifiable_kind, notifiable_id,
                   kind, read_at, created_at
            FROM notifications
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Notification::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Notification>> {
        let limit = limit.clamp(1, 100);

        let results = sqlx::query_as::<_, NotificationModel>(
            r"
            SELECT id, recipient_id, actor_id, notifiable_kind, notifiable_id,
                   kind, read_at, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY id DESC
            LIMIT $2
            ",
        )
        .bind(recipient_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Notification::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn create(&self, notification: &Notification) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO notifications (id, recipient_id, actor_id, notifiable_kind,
                                       notifiable_id, kind, read_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (recipient_id, notifiable_kind, notifiable_id, kind, actor_id)
            DO NOTHING
            ",
        )
        .bind(notification.id.into_inner())
        .bind(notification.recipient_id.into_inner())
        .bind(notification.actor_id.into_inner())
        .bind(notification.notifiable.kind())
        .bind(notification.notifiable.id().into_inner())
        .bind(notification.kind.as_str())
        .bind(notification.read_at)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
        read_at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        // Recipient scoping in the predicate doubles as the ownership check
        let result = sqlx::query(
            r"
            UPDATE notifications
            SET read_at = $3
            WHERE id = $1 AND recipient_id = $2 AND read_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(recipient_id.into_inner())
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_all_read(
        &self,
        recipient_id: Snowflake,
        read_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE notifications
            SET read_at = $2
            WHERE recipient_id = $1 AND read_at IS NULL
            ",
        )
        .bind(recipient_id.into_inner())
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn unread_count(&self, recipient_id: Snowflake) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM notifications
            WHERE recipient_id = $1 AND read_at IS NULL
            ",
        )
        .bind(recipient_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }
}
