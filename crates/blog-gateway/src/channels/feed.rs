//! Feed channel
//!
//! Public channel carrying the global feed of new posts. Clients can
//! additionally follow individual posts for updates.

use async_trait::async_trait;

use super::{join_topic, leave_matching, leave_topic, Channel, ChannelContext, ChannelError};
use crate::connection::Connection;
use crate::protocol::{ChannelCommand, ChannelKind};
use blog_core::value_objects::Topic;

/// Feed channel
pub struct FeedChannel;

#[async_trait]
impl Channel for FeedChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Feed
    }

    async fn on_subscribe(
        &self,
        ctx: &ChannelContext<'_>,
        conn: &Connection,
    ) -> Result<(), ChannelError> {
        // No identity required
        join_topic(ctx, conn, Topic::Feed).await;
        Ok(())
    }

    async fn on_unsubscribe(&self, ctx: &ChannelContext<'_>, conn: &Connection) {
        leave_matching(ctx, conn, |t| {
            matches!(t, Topic::Feed | Topic::Post(_))
        })
        .await;
    }

    async fn handle_message(
        &self,
        ctx: &ChannelContext<'_>,
        conn: &Connection,
        command: ChannelCommand,
    ) -> Result<(), ChannelError> {
        match command {
            ChannelCommand::FollowPost { post_id } => {
                join_topic(ctx, conn, Topic::Post(post_id)).await;
                Ok(())
            }
            ChannelCommand::UnfollowPost { post_id } => {
                leave_topic(ctx, conn, Topic::Post(post_id)).await;
                Ok(())
            }
            _ => Err(ChannelError::UnsupportedCommand(self.kind())),
        }
    }
}
