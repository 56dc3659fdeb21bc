//! In-memory fixtures
//!
//! Every storage and broker port backed by plain vectors behind mutexes.
//! The repositories mirror the transactional behavior of the PostgreSQL
//! implementations (dedup inserts, counter bumps, owner-scoped updates) so
//! service-level tests observe the same contracts without a database.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use blog_core::entities::{Comment, Notification, Post, Reaction, ReactionKind, Tag, User};
use blog_core::error::DomainError;
use blog_core::events::StreamEvent;
use blog_core::traits::{
    CommentRepository, CounterCacheMaintainer, CounterRecomputeReport, NotificationRepository,
    PostRepository, ReactionRepository, RepoResult, StreamPublisher, TagRepository,
    UserRepository,
};
use blog_core::value_objects::{
    CommentTarget, NotifiableRef, ReactionTarget, Snowflake, SnowflakeGenerator, Topic,
};
use blog_service::{ServiceContext, ServiceContextBuilder};

// ============================================================================
// Backend
// ============================================================================

/// Shared in-memory state behind every repository fixture
#[derive(Default)]
pub struct InMemoryBackend {
    pub users: Mutex<Vec<User>>,
    pub posts: Mutex<Vec<Post>>,
    pub comments: Mutex<Vec<Comment>>,
    pub reactions: Mutex<Vec<Reaction>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub tags: Mutex<Vec<Tag>>,
    /// (tag_id, post_id) pairs
    pub post_tags: Mutex<Vec<(Snowflake, Snowflake)>>,
    /// When set, every user lookup fails as if the database were down
    fail_user_lookups: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate a storage outage for user lookups
    pub fn fail_user_lookups(&self, fail: bool) {
        self.fail_user_lookups.store(fail, Ordering::SeqCst);
    }

    fn user_lookup_guard(&self) -> RepoResult<()> {
        if self.fail_user_lookups.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError(
                "simulated user lookup outage".to_string(),
            ));
        }
        Ok(())
    }

    fn bump_comment_counter(&self, target: CommentTarget, delta: i64) {
        match target {
            CommentTarget::Post(id) => {
                if let Some(post) = self.posts.lock().iter_mut().find(|p| p.id == id) {
                    post.comment_count += delta;
                }
            }
            CommentTarget::Comment(id) => {
                if let Some(comment) = self.comments.lock().iter_mut().find(|c| c.id == id) {
                    comment.comment_count += delta;
                }
            }
        }
    }

    fn bump_reaction_counter(&self, target: ReactionTarget, delta: i64) {
        match target {
            ReactionTarget::Post(id) => {
                if let Some(post) = self.posts.lock().iter_mut().find(|p| p.id == id) {
                    post.reaction_count += delta;
                }
            }
            ReactionTarget::Comment(id) => {
                if let Some(comment) = self.comments.lock().iter_mut().find(|c| c.id == id) {
                    comment.reaction_count += delta;
                }
            }
        }
    }
}

// ============================================================================
// User repository
// ============================================================================

pub struct InMemoryUserRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryUserRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        self.backend.user_lookup_guard()?;
        Ok(self.backend.users.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.backend.user_lookup_guard()?;
        Ok(self
            .backend
            .users
            .lock()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.backend.user_lookup_guard()?;
        Ok(self
            .backend
            .users
            .lock()
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn search_by_username_fragment(&self, fragment: &str) -> RepoResult<Option<User>> {
        self.backend.user_lookup_guard()?;
        let needle = fragment.to_ascii_lowercase();
        let users = self.backend.users.lock();
        let mut candidates: Vec<&User> = users
            .iter()
            .filter(|u| u.username.to_ascii_lowercase().contains(&needle))
            .collect();
        candidates.sort_by_key(|u| u.id);
        Ok(candidates.first().map(|u| (*u).clone()))
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        self.backend.users.lock().push(user.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.backend.users.lock().retain(|u| u.id != id);
        // Notifications cascade with their recipient
        self.backend
            .notifications
            .lock()
            .retain(|n| n.recipient_id != id);
        Ok(())
    }
}

// ============================================================================
// Post repository
// ============================================================================

pub struct InMemoryPostRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryPostRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        Ok(self.backend.posts.lock().iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>> {
        let posts = self.backend.posts.lock();
        let mut found: Vec<Post> = posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| std::cmp::Reverse(p.id));
        found.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(found)
    }

    async fn create(&self, post: &Post) -> RepoResult<()> {
        self.backend.posts.lock().push(post.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.backend.posts.lock().retain(|p| p.id != id);
        Ok(())
    }
}

// ============================================================================
// Comment repository
// ============================================================================

pub struct InMemoryCommentRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryCommentRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>> {
        Ok(self
            .backend
            .comments
            .lock()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_target(&self, target: CommentTarget, limit: i64) -> RepoResult<Vec<Comment>> {
        let comments = self.backend.comments.lock();
        let mut found: Vec<Comment> = comments
            .iter()
            .filter(|c| c.target == target)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.id);
        found.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(found)
    }

    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        self.backend.comments.lock().push(comment.clone());
        self.backend.bump_comment_counter(comment.target, 1);
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let removed = {
            let mut comments = self.backend.comments.lock();
            comments
                .iter()
                .position(|c| c.id == id)
                .map(|i| comments.remove(i))
        };
        let Some(removed) = removed else {
            return Err(DomainError::CommentNotFound(id));
        };
        self.backend.bump_comment_counter(removed.target, -1);
        Ok(())
    }
}

// ============================================================================
// Reaction repository
// ============================================================================

pub struct InMemoryReactionRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryReactionRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ReactionRepository for InMemoryReactionRepository {
    async fn find(
        &self,
        user_id: Snowflake,
        target: ReactionTarget,
        kind: ReactionKind,
    ) -> RepoResult<Option<Reaction>> {
        Ok(self
            .backend
            .reactions
            .lock()
            .iter()
            .find(|r| r.user_id == user_id && r.target == target && r.kind == kind)
            .cloned())
    }

    async fn find_by_target(&self, target: ReactionTarget) -> RepoResult<Vec<Reaction>> {
        Ok(self
            .backend
            .reactions
            .lock()
            .iter()
            .filter(|r| r.target == target)
            .cloned()
            .collect())
    }

    async fn create(&self, reaction: &Reaction) -> RepoResult<()> {
        {
            let mut reactions = self.backend.reactions.lock();
            let duplicate = reactions.iter().any(|r| {
                r.user_id == reaction.user_id
                    && r.target == reaction.target
                    && r.kind == reaction.kind
            });
            if duplicate {
                return Ok(());
            }
            reactions.push(reaction.clone());
        }
        self.backend.bump_reaction_counter(reaction.target, 1);
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let removed = {
            let mut reactions = self.backend.reactions.lock();
            reactions
                .iter()
                .position(|r| r.id == id)
                .map(|i| reactions.remove(i))
        };
        let Some(removed) = removed else {
            return Err(DomainError::DatabaseError(format!(
                "reaction {id} not found"
            )));
        };
        self.backend.bump_reaction_counter(removed.target, -1);
        Ok(())
    }
}

// ============================================================================
// Notification repository
// ============================================================================

pub struct InMemoryNotificationRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryNotificationRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        Ok(self
            .backend
            .notifications
            .lock()
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn find_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Notification>> {
        let notifications = self.backend.notifications.lock();
        let mut found: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        found.sort_by_key(|n| std::cmp::Reverse(n.id));
        found.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(found)
    }

    async fn create(&self, notification: &Notification) -> RepoResult<bool> {
        let mut notifications = self.backend.notifications.lock();
        let duplicate = notifications
            .iter()
            .any(|n| n.dedup_key() == notification.dedup_key());
        if duplicate {
            return Ok(false);
        }
        notifications.push(notification.clone());
        Ok(true)
    }

    async fn mark_read(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
        read_at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut notifications = self.backend.notifications.lock();
        let Some(notification) = notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient_id && n.read_at.is_none())
        else {
            return Ok(false);
        };
        notification.read_at = Some(read_at);
        Ok(true)
    }

    async fn mark_all_read(
        &self,
        recipient_id: Snowflake,
        read_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let mut notifications = self.backend.notifications.lock();
        let mut transitioned = 0u64;
        for notification in notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && n.read_at.is_none())
        {
            notification.read_at = Some(read_at);
            transitioned += 1;
        }
        Ok(transitioned)
    }

    async fn unread_count(&self, recipient_id: Snowflake) -> RepoResult<i64> {
        let count = self
            .backend
            .notifications
            .lock()
            .iter()
            .filter(|n| n.recipient_id == recipient_id && n.read_at.is_none())
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

// ============================================================================
// Tag repository
// ============================================================================

pub struct InMemoryTagRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryTagRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        Ok(self
            .backend
            .tags
            .lock()
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn create(&self, tag: &Tag) -> RepoResult<()> {
        let mut tags = self.backend.tags.lock();
        if tags.iter().any(|t| t.name == tag.name) {
            return Ok(());
        }
        tags.push(tag.clone());
        Ok(())
    }

    async fn tag_post(&self, tag_id: Snowflake, post_id: Snowflake) -> RepoResult<bool> {
        {
            let mut pairs = self.backend.post_tags.lock();
            if pairs.contains(&(tag_id, post_id)) {
                return Ok(false);
            }
            pairs.push((tag_id, post_id));
        }
        if let Some(tag) = self.backend.tags.lock().iter_mut().find(|t| t.id == tag_id) {
            tag.post_count += 1;
        }
        Ok(true)
    }

    async fn untag_post(&self, tag_id: Snowflake, post_id: Snowflake) -> RepoResult<bool> {
        {
            let mut pairs = self.backend.post_tags.lock();
            let Some(index) = pairs.iter().position(|p| *p == (tag_id, post_id)) else {
                return Ok(false);
            };
            pairs.remove(index);
        }
        if let Some(tag) = self.backend.tags.lock().iter_mut().find(|t| t.id == tag_id) {
            tag.post_count -= 1;
        }
        Ok(true)
    }
}

// ============================================================================
// Counter cache maintainer
// ============================================================================

pub struct InMemoryCounterCacheMaintainer {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryCounterCacheMaintainer {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl CounterCacheMaintainer for InMemoryCounterCacheMaintainer {
    async fn recompute_all(&self) -> RepoResult<CounterRecomputeReport> {
        let comments = self.backend.comments.lock().clone();
        let reactions = self.backend.reactions.lock().clone();
        let pairs = self.backend.post_tags.lock().clone();

        let mut report = CounterRecomputeReport::default();

        for post in self.backend.posts.lock().iter_mut() {
            let comment_count = count_of(&comments, |c| c.target == CommentTarget::Post(post.id));
            let reaction_count =
                count_of(&reactions, |r| r.target == ReactionTarget::Post(post.id));
            if post.comment_count != comment_count || post.reaction_count != reaction_count {
                post.comment_count = comment_count;
                post.reaction_count = reaction_count;
                report.posts_updated += 1;
            }
        }

        for comment in self.backend.comments.lock().iter_mut() {
            let comment_count =
                count_of(&comments, |c| c.target == CommentTarget::Comment(comment.id));
            let reaction_count =
                count_of(&reactions, |r| r.target == ReactionTarget::Comment(comment.id));
            if comment.comment_count != comment_count || comment.reaction_count != reaction_count
            {
                comment.comment_count = comment_count;
                comment.reaction_count = reaction_count;
                report.comments_updated += 1;
            }
        }

        for tag in self.backend.tags.lock().iter_mut() {
            let post_count = count_of(&pairs, |(tag_id, _)| *tag_id == tag.id);
            if tag.post_count != post_count {
                tag.post_count = post_count;
                report.tags_updated += 1;
            }
        }

        Ok(report)
    }
}

fn count_of<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> i64 {
    i64::try_from(items.iter().filter(|item| predicate(item)).count()).unwrap_or(i64::MAX)
}

// ============================================================================
// Recording publisher
// ============================================================================

/// Captures every published event instead of pushing it to a broker
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(Topic, StreamEvent)>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate a broker outage
    pub fn fail_publishes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every (topic, event) pair published so far
    pub fn events(&self) -> Vec<(Topic, StreamEvent)> {
        self.events.lock().clone()
    }

    /// Events published to one topic, in publish order
    pub fn events_for(&self, topic: Topic) -> Vec<StreamEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

#[async_trait]
impl StreamPublisher for RecordingPublisher {
    async fn publish(&self, topic: &Topic, event: &StreamEvent) -> Result<u32, DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::BrokerError("publisher offline".to_string()));
        }
        self.events.lock().push((*topic, event.clone()));
        Ok(1)
    }
}

// ============================================================================
// Recording topic watcher
// ============================================================================

/// Records broker topic interest instead of touching Redis, so channel
/// behavior can be driven fully in-process
#[derive(Default)]
pub struct RecordingTopicWatcher {
    watched: Mutex<Vec<Topic>>,
    released: Mutex<Vec<Topic>>,
}

impl RecordingTopicWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Topics handed to `watch`, in call order
    pub fn watched(&self) -> Vec<Topic> {
        self.watched.lock().clone()
    }

    /// Topics handed to `unwatch_if_unused`, in call order
    pub fn released(&self) -> Vec<Topic> {
        self.released.lock().clone()
    }
}

#[async_trait]
impl blog_gateway::dispatch::TopicWatcher for RecordingTopicWatcher {
    async fn watch(&self, topic: Topic) -> Result<(), blog_broker::SubscriberError> {
        self.watched.lock().push(topic);
        Ok(())
    }

    async fn unwatch_if_unused(&self, topic: Topic) -> Result<(), blog_broker::SubscriberError> {
        self.released.lock().push(topic);
        Ok(())
    }
}

// ============================================================================
// Test harness
// ============================================================================

/// A fully wired `ServiceContext` over in-memory ports, plus handles to the
/// backing state for assertions
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub backend: Arc<InMemoryBackend>,
    pub publisher: Arc<RecordingPublisher>,
}

impl TestHarness {
    pub fn new() -> Self {
        let backend = InMemoryBackend::new();
        let publisher = RecordingPublisher::new();

        let ctx = ServiceContextBuilder::new()
            .user_repo(Arc::new(InMemoryUserRepository::new(backend.clone())))
            .post_repo(Arc::new(InMemoryPostRepository::new(backend.clone())))
            .comment_repo(Arc::new(InMemoryCommentRepository::new(backend.clone())))
            .reaction_repo(Arc::new(InMemoryReactionRepository::new(backend.clone())))
            .notification_repo(Arc::new(InMemoryNotificationRepository::new(
                backend.clone(),
            )))
            .tag_repo(Arc::new(InMemoryTagRepository::new(backend.clone())))
            .publisher(publisher.clone())
            .counter_maintainer(Arc::new(InMemoryCounterCacheMaintainer::new(
                backend.clone(),
            )))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .build()
            .expect("all ports provided");

        Self {
            ctx,
            backend,
            publisher,
        }
    }

    /// Insert a user directly, bypassing any service-side effects
    pub fn seed_user(&self, username: &str, email: &str) -> User {
        let user = User::new(
            self.ctx.generate_id(),
            username.to_string(),
            email.to_string(),
        );
        self.backend.users.lock().push(user.clone());
        user
    }

    /// Insert a post directly, bypassing feed announcement and mentions
    pub fn seed_post(&self, author_id: Snowflake, title: &str, body: &str) -> Post {
        let post = Post::new(
            self.ctx.generate_id(),
            author_id,
            title.to_string(),
            body.to_string(),
        );
        self.backend.posts.lock().push(post.clone());
        post
    }

    /// Insert a comment directly, bypassing notifications. Counters are
    /// bumped the way the repository would.
    pub fn seed_comment(
        &self,
        author_id: Snowflake,
        target: CommentTarget,
        body: &str,
    ) -> Comment {
        let comment = Comment::new(self.ctx.generate_id(), author_id, target, body.to_string());
        self.backend.comments.lock().push(comment.clone());
        self.backend.bump_comment_counter(target, 1);
        comment
    }

    /// Look up a post's current state
    pub fn post(&self, id: Snowflake) -> Option<Post> {
        self.backend.posts.lock().iter().find(|p| p.id == id).cloned()
    }

    /// Look up a comment's current state
    pub fn comment(&self, id: Snowflake) -> Option<Comment> {
        self.backend
            .comments
            .lock()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// All stored notifications for a recipient, in insert order
    pub fn notifications_for(&self, recipient_id: Snowflake) -> Vec<Notification> {
        self.backend
            .notifications
            .lock()
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a post notifiable in assertions
pub fn post_ref(id: Snowflake) -> NotifiableRef {
    NotifiableRef::Post(id)
}
