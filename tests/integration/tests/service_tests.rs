//! Publication service integration tests
//!
//! Posts, comments, and reactions end to end: stream fan-out targets,
//! notification side effects, and counter maintenance.

use blog_core::entities::{NotificationKind, ReactionKind};
use blog_core::events::StreamEventType;
use blog_core::value_objects::{CommentTarget, NotifiableRef, ReactionTarget, Topic};
use blog_service::{
    CommentService, MaintenanceService, PostService, ReactionService, ServiceError,
};
use integration_tests::TestHarness;

// ============================================================================
// Posts
// ============================================================================

#[tokio::test]
async fn post_creation_announces_on_the_feed() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");

    let service = PostService::new(&harness.ctx);
    let post = service
        .create_post(
            author.id,
            "Hello".to_string(),
            "World".to_string(),
            vec!["rust".to_string()],
        )
        .await
        .unwrap();

    let feed = harness.publisher.events_for(Topic::Feed);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].event_type, StreamEventType::PostCreated);

    // The tag was created and attached
    let tags = harness.backend.tags.lock().clone();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "rust");
    assert_eq!(tags[0].post_count, 1);
    assert!(harness
        .backend
        .post_tags
        .lock()
        .contains(&(tags[0].id, post.id)));
}

#[tokio::test]
async fn post_mentioning_a_user_notifies_them() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let mentioned = harness.seed_user("bob", "bob@example.com");

    let service = PostService::new(&harness.ctx);
    let post = service
        .create_post(
            author.id,
            "For @bob".to_string(),
            "you should read this".to_string(),
            Vec::new(),
        )
        .await
        .unwrap();

    let notifications = harness.notifications_for(mentioned.id);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Mention);
    assert_eq!(notifications[0].actor_id, author.id);
    assert_eq!(notifications[0].notifiable, NotifiableRef::Post(post.id));

    // The mention also landed on the recipient's personal topic
    let pushed = harness
        .publisher
        .events_for(Topic::for_identity(mentioned.id));
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].event_type, StreamEventType::NotificationCreated);
}

#[tokio::test]
async fn self_mention_in_a_post_is_ignored() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");

    let service = PostService::new(&harness.ctx);
    service
        .create_post(
            author.id,
            "Note to @alice".to_string(),
            "remember this".to_string(),
            Vec::new(),
        )
        .await
        .unwrap();

    assert!(harness.notifications_for(author.id).is_empty());
}

#[tokio::test]
async fn empty_post_title_is_rejected() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");

    let service = PostService::new(&harness.ctx);
    let result = service
        .create_post(author.id, "   ".to_string(), "body".to_string(), Vec::new())
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
    assert!(harness.backend.posts.lock().is_empty());
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn comment_on_post_notifies_the_author_and_the_thread() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let commenter = harness.seed_user("bob", "bob@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");

    let service = CommentService::new(&harness.ctx);
    let comment = service
        .create_comment(
            commenter.id,
            CommentTarget::Post(post.id),
            "nice one".to_string(),
        )
        .await
        .unwrap();

    // Thread fan-out
    let thread = harness.publisher.events_for(Topic::PostComments(post.id));
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].event_type, StreamEventType::CommentCreated);

    // Author notification
    let notifications = harness.notifications_for(author.id);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::CommentOnPost);
    assert_eq!(
        notifications[0].notifiable,
        NotifiableRef::Comment(comment.id)
    );

    // Counter cache
    assert_eq!(harness.post(post.id).unwrap().comment_count, 1);
}

#[tokio::test]
async fn reply_lands_on_the_reply_topic() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let replier = harness.seed_user("bob", "bob@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");
    let parent = harness.seed_comment(author.id, CommentTarget::Post(post.id), "first");

    let service = CommentService::new(&harness.ctx);
    service
        .create_comment(
            replier.id,
            CommentTarget::Comment(parent.id),
            "replying".to_string(),
        )
        .await
        .unwrap();

    let replies = harness
        .publisher
        .events_for(Topic::CommentReplies(parent.id));
    assert_eq!(replies.len(), 1);

    let notifications = harness.notifications_for(author.id);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::ReplyToComment);

    assert_eq!(harness.comment(parent.id).unwrap().comment_count, 1);
}

#[tokio::test]
async fn commenting_on_own_post_creates_no_notification() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");

    let service = CommentService::new(&harness.ctx);
    service
        .create_comment(
            author.id,
            CommentTarget::Post(post.id),
            "my own note".to_string(),
        )
        .await
        .unwrap();

    assert!(harness.notifications_for(author.id).is_empty());
}

#[tokio::test]
async fn comment_on_a_missing_post_is_not_found() {
    let harness = TestHarness::new();
    let commenter = harness.seed_user("bob", "bob@example.com");
    let missing = harness.ctx.generate_id();

    let service = CommentService::new(&harness.ctx);
    let result = service
        .create_comment(commenter.id, CommentTarget::Post(missing), "hi".to_string())
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(harness.backend.comments.lock().is_empty());
}

#[tokio::test]
async fn empty_comment_body_is_rejected() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");

    let service = CommentService::new(&harness.ctx);
    let result = service
        .create_comment(author.id, CommentTarget::Post(post.id), "  ".to_string())
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn reaction_toggle_adds_then_removes() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let reactor = harness.seed_user("bob", "bob@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");

    let service = ReactionService::new(&harness.ctx);
    let target = ReactionTarget::Post(post.id);

    // First toggle creates
    assert!(service.toggle(reactor.id, target, ReactionKind::Like).await.unwrap());
    assert_eq!(harness.post(post.id).unwrap().reaction_count, 1);
    assert_eq!(harness.notifications_for(author.id).len(), 1);
    assert_eq!(
        harness.notifications_for(author.id)[0].kind,
        NotificationKind::ReactionOnPost
    );

    // Second toggle removes, and nobody is told about the removal
    assert!(!service.toggle(reactor.id, target, ReactionKind::Like).await.unwrap());
    assert_eq!(harness.post(post.id).unwrap().reaction_count, 0);
    assert_eq!(harness.notifications_for(author.id).len(), 1);

    let stream = harness.publisher.events_for(Topic::Post(post.id));
    let types: Vec<_> = stream.iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![StreamEventType::ReactionAdded, StreamEventType::ReactionRemoved]
    );
}

#[tokio::test]
async fn different_reaction_kinds_coexist_on_one_target() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let reactor = harness.seed_user("bob", "bob@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");

    let service = ReactionService::new(&harness.ctx);
    let target = ReactionTarget::Post(post.id);

    assert!(service.toggle(reactor.id, target, ReactionKind::Like).await.unwrap());
    assert!(service.toggle(reactor.id, target, ReactionKind::Love).await.unwrap());

    assert_eq!(harness.post(post.id).unwrap().reaction_count, 2);
    assert_eq!(service.list(target).await.unwrap().len(), 2);
}

// ============================================================================
// Counter maintenance
// ============================================================================

#[tokio::test]
async fn recompute_corrects_drifted_counters_once() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let commenter = harness.seed_user("bob", "bob@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");
    harness.seed_comment(commenter.id, CommentTarget::Post(post.id), "one");
    harness.seed_comment(commenter.id, CommentTarget::Post(post.id), "two");

    // Introduce drift the way a partial failure would
    if let Some(stored) = harness.backend.posts.lock().iter_mut().find(|p| p.id == post.id) {
        stored.comment_count = 99;
    }

    let service = MaintenanceService::new(&harness.ctx);

    let report = service.recompute_counters().await.unwrap();
    assert_eq!(report.posts_updated, 1);
    assert_eq!(harness.post(post.id).unwrap().comment_count, 2);

    // Idempotent: a clean second pass corrects nothing
    let report = service.recompute_counters().await.unwrap();
    assert_eq!(report.total(), 0);
}

#[tokio::test]
async fn recompute_restores_true_counts_at_any_scale() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let commenter = harness.seed_user("bob", "bob@example.com");

    let bare = harness.seed_post(author.id, "Bare", "no comments");
    let single = harness.seed_post(author.id, "Single", "one comment");
    let busy = harness.seed_post(author.id, "Busy", "many comments");

    harness.seed_comment(commenter.id, CommentTarget::Post(single.id), "only");
    for i in 0..120 {
        harness.seed_comment(
            commenter.id,
            CommentTarget::Post(busy.id),
            &format!("comment {i}"),
        );
    }

    // Drift every counter, including the post with no comments at all
    for post in harness.backend.posts.lock().iter_mut() {
        post.comment_count = 7;
    }

    let service = MaintenanceService::new(&harness.ctx);
    let report = service.recompute_counters().await.unwrap();

    assert_eq!(report.posts_updated, 3);
    assert_eq!(harness.post(bare.id).unwrap().comment_count, 0);
    assert_eq!(harness.post(single.id).unwrap().comment_count, 1);
    assert_eq!(harness.post(busy.id).unwrap().comment_count, 120);

    let report = service.recompute_counters().await.unwrap();
    assert_eq!(report.total(), 0);
}
