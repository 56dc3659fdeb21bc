//! Notification channel
//!
//! Identity-scoped channel. Subscribing joins the stable per-user topic,
//! so every device of one user converges on the same stream. Anonymous
//! subscription is an explicit refusal, not a silent no-op.

use async_trait::async_trait;
use tracing::debug;

use super::{join_topic, leave_matching, Channel, ChannelContext, ChannelError};
use crate::connection::Connection;
use crate::protocol::{ChannelCommand, ChannelKind};
use blog_core::value_objects::Topic;
use blog_service::NotificationService;

/// Notification channel
pub struct NotificationChannel;

#[async_trait]
impl Channel for NotificationChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Notification
    }

    async fn on_subscribe(
        &self,
        ctx: &ChannelContext<'_>,
        conn: &Connection,
    ) -> Result<(), ChannelError> {
        let Some(user_id) = conn.user_id() else {
            return Err(ChannelError::AuthenticationRequired);
        };

        join_topic(ctx, conn, Topic::for_identity(user_id)).await;
        Ok(())
    }

    async fn on_unsubscribe(&self, ctx: &ChannelContext<'_>, conn: &Connection) {
        leave_matching(ctx, conn, |t| matches!(t, Topic::UserNotifications(_))).await;
    }

    async fn handle_message(
        &self,
        ctx: &ChannelContext<'_>,
        conn: &Connection,
        command: ChannelCommand,
    ) -> Result<(), ChannelError> {
        let Some(user_id) = conn.user_id() else {
            return Err(ChannelError::AuthenticationRequired);
        };

        let service = NotificationService::new(ctx.services);

        match command {
            ChannelCommand::MarkRead { notification_id } => {
                // Not-owned and already-read both come back unchanged,
                // which is exactly the silent no-op the client expects
                let changed = service.mark_read(notification_id, user_id).await?;
                if !changed {
                    debug!(
                        notification_id = %notification_id,
                        user_id = %user_id,
                        "mark_read changed nothing"
                    );
                }
                Ok(())
            }
            ChannelCommand::MarkAllRead => {
                service.mark_all_read(user_id).await?;
                Ok(())
            }
            _ => Err(ChannelError::UnsupportedCommand(self.kind())),
        }
    }
}
