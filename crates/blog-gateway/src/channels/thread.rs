//! Thread channel
//!
//! Comment thread updates. Joins no topic on subscribe; clients follow
//! the specific posts and comments they are viewing.

use async_trait::async_trait;

use super::{join_topic, leave_matching, leave_topic, Channel, ChannelContext, ChannelError};
use crate::connection::Connection;
use crate::protocol::{ChannelCommand, ChannelKind};
use blog_core::value_objects::Topic;

/// Thread channel
pub struct ThreadChannel;

#[async_trait]
impl Channel for ThreadChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Thread
    }

    async fn on_subscribe(
        &self,
        _ctx: &ChannelContext<'_>,
        _conn: &Connection,
    ) -> Result<(), ChannelError> {
        // Nothing joined by default
        Ok(())
    }

    async fn on_unsubscribe(&self, ctx: &ChannelContext<'_>, conn: &Connection) {
        leave_matching(ctx, conn, |t| {
            matches!(t, Topic::PostComments(_) | Topic::CommentReplies(_))
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
                join_topic(ctx, conn, Topic::PostComments(post_id)).await;
                Ok(())
            }
            ChannelCommand::UnfollowPost { post_id } => {
                leave_topic(ctx, conn, Topic::PostComments(post_id)).await;
                Ok(())
            }
            ChannelCommand::FollowComment { comment_id } => {
                join_topic(ctx, conn, Topic::CommentReplies(comment_id)).await;
                Ok(())
            }
            ChannelCommand::UnfollowComment { comment_id } => {
                leave_topic(ctx, conn, Topic::CommentReplies(comment_id)).await;
                Ok(())
            }
            _ => Err(ChannelError::UnsupportedCommand(self.kind())),
        }
    }
}
