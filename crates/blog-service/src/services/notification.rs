//! Notification service
//!
//! Creates notification records and pushes them to the recipient's personal
//! topic. Creation is dedup-aware: the storage layer collapses duplicate
//! (recipient, notifiable, kind, actor) tuples, and this service treats a
//! collapsed insert as a quiet no-op. Stream publishing is best-effort
//! everywhere; the write that triggered a notification never fails because
//! the broker is down.

use blog_core::entities::{Notification, NotificationKind};
use blog_core::events::{StreamEvent, StreamEventType};
use blog_core::value_objects::{NotifiableRef, Snowflake, Topic};
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::mention::MentionResolver;

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a notification and push it to the recipient's topic.
    ///
    /// Returns `None` when nothing was recorded: the actor notifying
    /// themselves, or an identical notification already exists.
    #[instrument(skip(self))]
    pub async fn notify(
        &self,
        recipient_id: Snowflake,
        actor_id: Snowflake,
        notifiable: NotifiableRef,
        kind: NotificationKind,
    ) -> ServiceResult<Option<Notification>> {
        // Users never hear about their own activity
        if recipient_id == actor_id {
            return Ok(None);
        }

        let notification = Notification::new(
            self.ctx.generate_id(),
            recipient_id,
            actor_id,
            notifiable,
            kind,
        );

        let inserted = self.ctx.notification_repo().create(&notification).await?;
        if !inserted {
            return Ok(None);
        }

        info!(
            recipient_id = %recipient_id,
            actor_id = %actor_id,
            notifiable = %notifiable,
            kind = %kind,
            "Notification created"
        );

        let event = StreamEvent::new(
            StreamEventType::NotificationCreated,
            json!({
                "id": notification.id.to_string(),
                "recipient_id": recipient_id.to_string(),
                "actor_id": actor_id.to_string(),
                "notifiable": notifiable,
                "kind": kind,
                "created_at": notification.created_at,
            }),
        );
        self.publish_to_recipient(recipient_id, &event).await;

        Ok(Some(notification))
    }

    /// Scan `text` for mentions and notify every resolved user except the
    /// actor.
    ///
    /// Mention fan-out is an enrichment of the triggering write, so any
    /// failure inside the batch collapses the whole batch to nothing rather
    /// than propagating.
    #[instrument(skip(self, text))]
    pub async fn notify_mentions(
        &self,
        actor_id: Snowflake,
        notifiable: NotifiableRef,
        text: &str,
    ) -> Vec<Notification> {
        match self.try_notify_mentions(actor_id, notifiable, text).await {
            Ok(created) => created,
            Err(err) => {
                warn!(
                    actor_id = %actor_id,
                    notifiable = %notifiable,
                    error = %err,
                    "Mention fan-out failed, batch dropped"
                );
                Vec::new()
            }
        }
    }

    async fn try_notify_mentions(
        &self,
        actor_id: Snowflake,
        notifiable: NotifiableRef,
        text: &str,
    ) -> ServiceResult<Vec<Notification>> {
        let resolver = MentionResolver::new(self.ctx);
        let mentioned = resolver.resolve_text(text).await?;

        let mut created = Vec::new();
        for user in mentioned {
            if let Some(notification) = self
                .notify(user.id, actor_id, notifiable, NotificationKind::Mention)
                .await?
            {
                created.push(notification);
            }
        }

        Ok(created)
    }

    /// Mark one notification read.
    ///
    /// Scoped to the recipient: a notification belonging to someone else is
    /// untouched. Marking an already-read notification is a no-op. Returns
    /// whether this call transitioned the read state.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
    ) -> ServiceResult<bool> {
        let changed = self
            .ctx
            .notification_repo()
            .mark_read(id, recipient_id, Utc::now())
            .await?;

        if changed {
            let event = StreamEvent::new(
                StreamEventType::NotificationRead,
                json!({ "id": id.to_string() }),
            );
            self.publish_to_recipient(recipient_id, &event).await;
        }

        Ok(changed)
    }

    /// Mark every unread notification of the recipient read. Returns the
    /// number of notifications that transitioned.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, recipient_id: Snowflake) -> ServiceResult<u64> {
        let changed = self
            .ctx
            .notification_repo()
            .mark_all_read(recipient_id, Utc::now())
            .await?;

        if changed > 0 {
            let event = StreamEvent::new(
                StreamEventType::NotificationsAllRead,
                json!({ "count": changed }),
            );
            self.publish_to_recipient(recipient_id, &event).await;
        }

        Ok(changed)
    }

    /// Count of unread notifications for the recipient
    #[instrument(skip(self))]
    pub async fn unread_count(&self, recipient_id: Snowflake) -> ServiceResult<i64> {
        Ok(self
            .ctx
            .notification_repo()
            .unread_count(recipient_id)
            .await?)
    }

    /// Most recent notifications for the recipient, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        recipient_id: Snowflake,
        limit: i64,
    ) -> ServiceResult<Vec<Notification>> {
        Ok(self
            .ctx
            .notification_repo()
            .find_by_recipient(recipient_id, limit)
            .await?)
    }

    async fn publish_to_recipient(&self, recipient_id: Snowflake, event: &StreamEvent) {
        let topic = Topic::for_identity(recipient_id);
        if let Err(err) = self.ctx.publisher().publish(&topic, event).await {
            warn!(
                topic = %topic.name(),
                error = %err,
                "Notification publish failed"
            );
        }
    }
}
