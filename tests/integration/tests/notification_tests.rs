//! Notification service integration tests
//!
//! Exercises dedup, read-state transitions, self-notification suppression,
//! and the best-effort publish policy against in-memory ports.

use blog_core::entities::NotificationKind;
use blog_core::events::StreamEventType;
use blog_core::value_objects::{NotifiableRef, Topic};
use blog_service::NotificationService;
use integration_tests::TestHarness;

// ============================================================================
// Dedup
// ============================================================================

#[tokio::test]
async fn identical_notifications_collapse_to_one_record() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let actor = harness.seed_user("bob", "bob@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");

    let service = NotificationService::new(&harness.ctx);

    let first = service
        .notify(
            author.id,
            actor.id,
            NotifiableRef::Post(post.id),
            NotificationKind::CommentOnPost,
        )
        .await
        .unwrap();
    assert!(first.is_some());

    let second = service
        .notify(
            author.id,
            actor.id,
            NotifiableRef::Post(post.id),
            NotificationKind::CommentOnPost,
        )
        .await
        .unwrap();
    assert!(second.is_none());

    assert_eq!(harness.notifications_for(author.id).len(), 1);
    assert_eq!(service.unread_count(author.id).await.unwrap(), 1);

    // Only the inserted record was pushed to the recipient topic
    let pushed = harness.publisher.events_for(Topic::for_identity(author.id));
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].event_type, StreamEventType::NotificationCreated);
}

#[tokio::test]
async fn distinct_notifiable_creates_a_new_record() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let actor = harness.seed_user("bob", "bob@example.com");
    let first_post = harness.seed_post(author.id, "One", "Body");
    let second_post = harness.seed_post(author.id, "Two", "Body");

    let service = NotificationService::new(&harness.ctx);

    for post in [&first_post, &second_post] {
        let created = service
            .notify(
                author.id,
                actor.id,
                NotifiableRef::Post(post.id),
                NotificationKind::CommentOnPost,
            )
            .await
            .unwrap();
        assert!(created.is_some());
    }

    assert_eq!(harness.notifications_for(author.id).len(), 2);
}

// ============================================================================
// Self-notification
// ============================================================================

#[tokio::test]
async fn actor_never_hears_about_own_activity() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let post = harness.seed_post(author.id, "Hello", "World");

    let service = NotificationService::new(&harness.ctx);

    let created = service
        .notify(
            author.id,
            author.id,
            NotifiableRef::Post(post.id),
            NotificationKind::CommentOnPost,
        )
        .await
        .unwrap();

    assert!(created.is_none());
    assert!(harness.notifications_for(author.id).is_empty());
    assert_eq!(harness.publisher.count(), 0);
}

// ============================================================================
// Read state
// ============================================================================

#[tokio::test]
async fn mark_read_is_owner_scoped_and_idempotent() {
    let harness = TestHarness::new();
    let recipient = harness.seed_user("alice", "alice@example.com");
    let actor = harness.seed_user("bob", "bob@example.com");
    let stranger = harness.seed_user("mallory", "mallory@example.com");
    let post = harness.seed_post(recipient.id, "Hello", "World");

    let service = NotificationService::new(&harness.ctx);

    let notification = service
        .notify(
            recipient.id,
            actor.id,
            NotifiableRef::Post(post.id),
            NotificationKind::CommentOnPost,
        )
        .await
        .unwrap()
        .expect("notification created");

    // Someone else's mark_read leaves the record untouched
    let changed = service.mark_read(notification.id, stranger.id).await.unwrap();
    assert!(!changed);
    assert_eq!(service.unread_count(recipient.id).await.unwrap(), 1);

    // The owner transitions it exactly once
    assert!(service.mark_read(notification.id, recipient.id).await.unwrap());
    assert!(!service.mark_read(notification.id, recipient.id).await.unwrap());
    assert_eq!(service.unread_count(recipient.id).await.unwrap(), 0);

    // One created event, one read event, nothing for the no-ops
    let pushed = harness
        .publisher
        .events_for(Topic::for_identity(recipient.id));
    let read_events: Vec<_> = pushed
        .iter()
        .filter(|e| e.event_type == StreamEventType::NotificationRead)
        .collect();
    assert_eq!(read_events.len(), 1);
}

#[tokio::test]
async fn mark_all_read_clears_the_unread_count() {
    let harness = TestHarness::new();
    let recipient = harness.seed_user("alice", "alice@example.com");
    let actor = harness.seed_user("bob", "bob@example.com");

    let service = NotificationService::new(&harness.ctx);

    for _ in 0..3 {
        let post = harness.seed_post(recipient.id, "Post", "Body");
        service
            .notify(
                recipient.id,
                actor.id,
                NotifiableRef::Post(post.id),
                NotificationKind::CommentOnPost,
            )
            .await
            .unwrap()
            .expect("notification created");
    }

    assert_eq!(service.unread_count(recipient.id).await.unwrap(), 3);
    assert_eq!(service.mark_all_read(recipient.id).await.unwrap(), 3);
    assert_eq!(service.unread_count(recipient.id).await.unwrap(), 0);

    // A second sweep transitions nothing and pushes nothing
    let events_before = harness.publisher.count();
    assert_eq!(service.mark_all_read(recipient.id).await.unwrap(), 0);
    assert_eq!(harness.publisher.count(), events_before);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let harness = TestHarness::new();
    let recipient = harness.seed_user("alice", "alice@example.com");
    let actor = harness.seed_user("bob", "bob@example.com");

    let service = NotificationService::new(&harness.ctx);

    let mut created_ids = Vec::new();
    for _ in 0..3 {
        let post = harness.seed_post(recipient.id, "Post", "Body");
        let notification = service
            .notify(
                recipient.id,
                actor.id,
                NotifiableRef::Post(post.id),
                NotificationKind::CommentOnPost,
            )
            .await
            .unwrap()
            .expect("notification created");
        created_ids.push(notification.id);
    }

    let listed = service.list(recipient.id, 10).await.unwrap();
    let listed_ids: Vec<_> = listed.iter().map(|n| n.id).collect();
    created_ids.reverse();
    assert_eq!(listed_ids, created_ids);
}

// ============================================================================
// Failure policy
// ============================================================================

#[tokio::test]
async fn broker_outage_never_fails_the_write() {
    let harness = TestHarness::new();
    let recipient = harness.seed_user("alice", "alice@example.com");
    let actor = harness.seed_user("bob", "bob@example.com");
    let post = harness.seed_post(recipient.id, "Hello", "World");

    harness.publisher.fail_publishes(true);

    let service = NotificationService::new(&harness.ctx);
    let created = service
        .notify(
            recipient.id,
            actor.id,
            NotifiableRef::Post(post.id),
            NotificationKind::CommentOnPost,
        )
        .await
        .unwrap();

    // The record exists even though the push was lost
    assert!(created.is_some());
    assert_eq!(harness.notifications_for(recipient.id).len(), 1);
}

#[tokio::test]
async fn mention_batch_collapses_on_lookup_failure() {
    let harness = TestHarness::new();
    let actor = harness.seed_user("bob", "bob@example.com");
    harness.seed_user("alice", "alice@example.com");
    let post = harness.seed_post(actor.id, "Hello", "cc @alice");

    harness.backend.fail_user_lookups(true);

    let service = NotificationService::new(&harness.ctx);
    let created = service
        .notify_mentions(actor.id, NotifiableRef::Post(post.id), "cc @alice")
        .await;

    assert!(created.is_empty());
    assert!(harness.backend.notifications.lock().is_empty());
}
