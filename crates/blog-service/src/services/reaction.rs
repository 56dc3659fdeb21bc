//! Reaction service
//!
//! Reactions toggle: creating a (user, target, kind) tuple that already
//! exists removes it instead. Only the creating half notifies the target's
//! author; removal is silent apart from the stream event.

use blog_core::entities::{NotificationKind, Reaction, ReactionKind};
use blog_core::events::{StreamEvent, StreamEventType};
use blog_core::value_objects::{NotifiableRef, ReactionTarget, Snowflake, Topic};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notification::NotificationService;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Toggle a reaction on a post or comment.
    ///
    /// Returns `true` when the reaction exists after the call (it was
    /// created) and `false` when it was removed.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        user_id: Snowflake,
        target: ReactionTarget,
        kind: ReactionKind,
    ) -> ServiceResult<bool> {
        let target_author = self.target_author(&target).await?;

        if let Some(existing) = self.ctx.reaction_repo().find(user_id, target, kind).await? {
            self.ctx.reaction_repo().delete(existing.id).await?;

            info!(
                reaction_id = %existing.id,
                user_id = %user_id,
                kind = %kind,
                "Reaction removed"
            );

            let event = StreamEvent::new(
                StreamEventType::ReactionRemoved,
                json!({
                    "id": existing.id.to_string(),
                    "user_id": user_id.to_string(),
                    "target": target,
                    "kind": kind,
                }),
            );
            self.publish(&target, &event).await;

            return Ok(false);
        }

        let reaction = Reaction::new(self.ctx.generate_id(), user_id, target, kind);
        self.ctx.reaction_repo().create(&reaction).await?;

        info!(
            reaction_id = %reaction.id,
            user_id = %user_id,
            kind = %kind,
            "Reaction added"
        );

        let event = StreamEvent::new(
            StreamEventType::ReactionAdded,
            json!({
                "id": reaction.id.to_string(),
                "user_id": user_id.to_string(),
                "target": target,
                "kind": kind,
                "created_at": reaction.created_at,
            }),
        );
        self.publish(&target, &event).await;

        let notifications = NotificationService::new(self.ctx);
        if let Err(err) = notifications
            .notify(
                target_author,
                user_id,
                NotifiableRef::Reaction(reaction.id),
                NotificationKind::for_reaction(&target),
            )
            .await
        {
            warn!(error = %err, "Reaction notification failed");
        }

        Ok(true)
    }

    /// All reactions on a target
    #[instrument(skip(self))]
    pub async fn list(&self, target: ReactionTarget) -> ServiceResult<Vec<Reaction>> {
        Ok(self.ctx.reaction_repo().find_by_target(target).await?)
    }

    async fn target_author(&self, target: &ReactionTarget) -> ServiceResult<Snowflake> {
        match target {
            ReactionTarget::Post(id) => {
                let post = self
                    .ctx
                    .post_repo()
                    .find_by_id(*id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Post", id.to_string()))?;
                Ok(post.author_id)
            }
            ReactionTarget::Comment(id) => {
                let comment = self
                    .ctx
                    .comment_repo()
                    .find_by_id(*id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Comment", id.to_string()))?;
                Ok(comment.author_id)
            }
        }
    }

    async fn publish(&self, target: &ReactionTarget, event: &StreamEvent) {
        let topic = reaction_topic(target);
        if let Err(err) = self.ctx.publisher().publish(&topic, event).await {
            warn!(topic = %topic.name(), error = %err, "Reaction publish failed");
        }
    }
}

/// The topic a reaction on `target` broadcasts to: the post's own topic,
/// or the reply thread for reactions on comments
fn reaction_topic(target: &ReactionTarget) -> Topic {
    match target {
        ReactionTarget::Post(id) => Topic::Post(*id),
        ReactionTarget::Comment(id) => Topic::CommentReplies(*id),
    }
}
