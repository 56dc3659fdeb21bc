//! Post service
//!
//! Creates posts, announces them on the global feed topic, attaches tags,
//! and fans out mention notifications from the title and body.

use blog_core::entities::{Post, Tag};
use blog_core::events::{StreamEvent, StreamEventType};
use blog_core::value_objects::{NotifiableRef, Snowflake, Topic};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notification::NotificationService;

/// Longest accepted post title, in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Longest accepted post body, in characters
pub const MAX_BODY_LENGTH: usize = 100_000;

/// Post service
pub struct PostService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PostService<'a> {
    /// Create a new PostService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a post, announce it on the feed, attach tags, and notify
    /// mentioned users
    #[instrument(skip(self, title, body, tags))]
    pub async fn create_post(
        &self,
        author_id: Snowflake,
        title: String,
        body: String,
        tags: Vec<String>,
    ) -> ServiceResult<Post> {
        if title.trim().is_empty() {
            return Err(ServiceError::validation("post title must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ServiceError::validation(format!(
                "post title exceeds {MAX_TITLE_LENGTH} characters"
            )));
        }
        if body.chars().count() > MAX_BODY_LENGTH {
            return Err(ServiceError::validation(format!(
                "post body exceeds {MAX_BODY_LENGTH} characters"
            )));
        }

        let post = Post::new(self.ctx.generate_id(), author_id, title, body);
        self.ctx.post_repo().create(&post).await?;

        info!(post_id = %post.id, author_id = %author_id, "Post created");

        for name in tags {
            if let Err(err) = self.attach_tag(post.id, &name).await {
                warn!(post_id = %post.id, tag = %name, error = %err, "Tag attach failed");
            }
        }

        let event = StreamEvent::new(
            StreamEventType::PostCreated,
            json!({
                "id": post.id.to_string(),
                "author_id": author_id.to_string(),
                "title": post.title,
                "created_at": post.created_at,
            }),
        );
        if let Err(err) = self.ctx.publisher().publish(&Topic::Feed, &event).await {
            warn!(error = %err, "Feed publish failed");
        }

        // Mentions are scanned over the title and body together
        NotificationService::new(self.ctx)
            .notify_mentions(author_id, NotifiableRef::Post(post.id), &post.mention_text())
            .await;

        Ok(post)
    }

    /// Delete a post. Only the author may delete their own post.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: Snowflake, author_id: Snowflake) -> ServiceResult<()> {
        let post = self
            .ctx
            .post_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post", id.to_string()))?;

        if post.author_id != author_id {
            return Err(ServiceError::not_found("Post", id.to_string()));
        }

        self.ctx.post_repo().delete(id).await?;

        info!(post_id = %id, author_id = %author_id, "Post deleted");

        Ok(())
    }

    /// Recent posts by one author, newest first
    #[instrument(skip(self))]
    pub async fn list_by_author(
        &self,
        author_id: Snowflake,
        limit: i64,
    ) -> ServiceResult<Vec<Post>> {
        Ok(self.ctx.post_repo().find_by_author(author_id, limit).await?)
    }

    /// Attach a named tag to a post, creating the tag on first use. The
    /// tag's post counter moves only when the link is new.
    #[instrument(skip(self))]
    pub async fn attach_tag(&self, post_id: Snowflake, name: &str) -> ServiceResult<bool> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ServiceError::validation("tag name must not be empty"));
        }

        let tag = match self.ctx.tag_repo().find_by_name(&name).await? {
            Some(tag) => tag,
            None => {
                let tag = Tag::new(self.ctx.generate_id(), name.clone());
                self.ctx.tag_repo().create(&tag).await?;
                // A concurrent creator may have won the insert; re-read so
                // the link references the surviving row
                self.ctx
                    .tag_repo()
                    .find_by_name(&name)
                    .await?
                    .unwrap_or(tag)
            }
        };

        Ok(self.ctx.tag_repo().tag_post(tag.id, post_id).await?)
    }

    /// Detach a named tag from a post
    #[instrument(skip(self))]
    pub async fn detach_tag(&self, post_id: Snowflake, name: &str) -> ServiceResult<bool> {
        let name = name.trim().to_lowercase();
        let Some(tag) = self.ctx.tag_repo().find_by_name(&name).await? else {
            return Ok(false);
        };

        Ok(self.ctx.tag_repo().untag_post(tag.id, post_id).await?)
    }
}
