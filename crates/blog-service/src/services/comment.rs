//! Comment service
//!
//! Creates comments on posts and replies on comments. Each create publishes
//! a thread event, notifies the author of the parent, and fans out mention
//! notifications from the comment body.

use blog_core::entities::{Comment, NotificationKind};
use blog_core::events::{StreamEvent, StreamEventType};
use blog_core::value_objects::{CommentTarget, NotifiableRef, Snowflake, Topic};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notification::NotificationService;

/// Longest accepted comment body, in characters
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a comment on a post or a reply under a comment
    #[instrument(skip(self, body))]
    pub async fn create_comment(
        &self,
        author_id: Snowflake,
        target: CommentTarget,
        body: String,
    ) -> ServiceResult<Comment> {
        if body.trim().is_empty() {
            return Err(ServiceError::validation("comment body must not be empty"));
        }
        if body.chars().count() > MAX_COMMENT_LENGTH {
            return Err(ServiceError::validation(format!(
                "comment body exceeds {MAX_COMMENT_LENGTH} characters"
            )));
        }

        let parent_author = self.target_author(&target).await?;

        let comment = Comment::new(self.ctx.generate_id(), author_id, target, body);
        self.ctx.comment_repo().create(&comment).await?;

        info!(
            comment_id = %comment.id,
            author_id = %author_id,
            target = %target.id(),
            "Comment created"
        );

        let event = StreamEvent::new(
            StreamEventType::CommentCreated,
            json!({
                "id": comment.id.to_string(),
                "author_id": author_id.to_string(),
                "target": target,
                "body": comment.body,
                "created_at": comment.created_at,
            }),
        );
        let topic = thread_topic(&target);
        if let Err(err) = self.ctx.publisher().publish(&topic, &event).await {
            warn!(topic = %topic.name(), error = %err, "Comment publish failed");
        }

        let notifications = NotificationService::new(self.ctx);
        let notifiable = NotifiableRef::Comment(comment.id);
        if let Err(err) = notifications
            .notify(
                parent_author,
                author_id,
                notifiable,
                NotificationKind::for_comment(&target),
            )
            .await
        {
            warn!(error = %err, "Comment notification failed");
        }
        notifications
            .notify_mentions(author_id, notifiable, &comment.body)
            .await;

        Ok(comment)
    }

    /// Delete a comment. Only the author may delete their own comment.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, id: Snowflake, author_id: Snowflake) -> ServiceResult<()> {
        let comment = self
            .ctx
            .comment_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment", id.to_string()))?;

        if comment.author_id != author_id {
            return Err(ServiceError::not_found("Comment", id.to_string()));
        }

        self.ctx.comment_repo().delete(id).await?;

        info!(comment_id = %id, author_id = %author_id, "Comment deleted");

        Ok(())
    }

    /// Comments attached to a target, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self, target: CommentTarget, limit: i64) -> ServiceResult<Vec<Comment>> {
        Ok(self.ctx.comment_repo().find_by_target(target, limit).await?)
    }

    async fn target_author(&self, target: &CommentTarget) -> ServiceResult<Snowflake> {
        match target {
            CommentTarget::Post(id) => {
                let post = self
                    .ctx
                    .post_repo()
                    .find_by_id(*id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Post", id.to_string()))?;
                Ok(post.author_id)
            }
            CommentTarget::Comment(id) => {
                let parent = self
                    .ctx
                    .comment_repo()
                    .find_by_id(*id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Comment", id.to_string()))?;
                Ok(parent.author_id)
            }
        }
    }
}

/// The thread topic a comment on `target` broadcasts to
fn thread_topic(target: &CommentTarget) -> Topic {
    match target {
        CommentTarget::Post(id) => Topic::PostComments(*id),
        CommentTarget::Comment(id) => Topic::CommentReplies(*id),
    }
}
