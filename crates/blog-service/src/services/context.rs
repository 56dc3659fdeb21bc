//! Dependency container for the service layer.
//!
//! Every port is a trait object: the gateway wires PostgreSQL and Redis
//! implementations, the integration tests wire in-memory ones.

use std::sync::Arc;

use blog_core::traits::{
    CommentRepository, CounterCacheMaintainer, NotificationRepository, PostRepository,
    ReactionRepository, StreamPublisher, TagRepository, UserRepository,
};
use blog_core::SnowflakeGenerator;

use super::error::{ServiceError, ServiceResult};

/// Everything a service needs, behind one cloneable handle
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    post_repo: Arc<dyn PostRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    tag_repo: Arc<dyn TagRepository>,

    publisher: Arc<dyn StreamPublisher>,
    counter_maintainer: Arc<dyn CounterCacheMaintainer>,

    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    pub fn tag_repo(&self) -> &dyn TagRepository {
        self.tag_repo.as_ref()
    }

    pub fn publisher(&self) -> &dyn StreamPublisher {
        self.publisher.as_ref()
    }

    pub fn counter_maintainer(&self) -> &dyn CounterCacheMaintainer {
        self.counter_maintainer.as_ref()
    }

    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Mint a fresh entity ID
    pub fn generate_id(&self) -> blog_core::Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Trait objects have nothing useful to show
        f.debug_struct("ServiceContext").finish_non_exhaustive()
    }
}

/// Collects ports one by one; `build` fails on anything left unset
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    post_repo: Option<Arc<dyn PostRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    tag_repo: Option<Arc<dyn TagRepository>>,
    publisher: Option<Arc<dyn StreamPublisher>>,
    counter_maintainer: Option<Arc<dyn CounterCacheMaintainer>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

fn provided<T>(port: Option<T>, name: &str) -> ServiceResult<T> {
    port.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn tag_repo(mut self, repo: Arc<dyn TagRepository>) -> Self {
        self.tag_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn StreamPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn counter_maintainer(mut self, maintainer: Arc<dyn CounterCacheMaintainer>) -> Self {
        self.counter_maintainer = Some(maintainer);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Assemble the context.
    ///
    /// # Errors
    /// Returns a validation error naming the first missing port.
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            user_repo: provided(self.user_repo, "user_repo")?,
            post_repo: provided(self.post_repo, "post_repo")?,
            comment_repo: provided(self.comment_repo, "comment_repo")?,
            reaction_repo: provided(self.reaction_repo, "reaction_repo")?,
            notification_repo: provided(self.notification_repo, "notification_repo")?,
            tag_repo: provided(self.tag_repo, "tag_repo")?,
            publisher: provided(self.publisher, "publisher")?,
            counter_maintainer: provided(self.counter_maintainer, "counter_maintainer")?,
            snowflake_generator: provided(self.snowflake_generator, "snowflake_generator")?,
        })
    }
}
