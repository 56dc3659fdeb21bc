//! Mention resolution integration tests
//!
//! The extraction grammar itself is covered in the core crate; these tests
//! exercise resolution against a seeded user base.

use blog_service::MentionResolver;
use integration_tests::TestHarness;

#[tokio::test]
async fn resolves_emails_before_usernames() {
    let harness = TestHarness::new();
    let john = harness.seed_user("john", "john@example.com");
    let jane = harness.seed_user("jane_doe", "jane@example.com");

    let resolver = MentionResolver::new(&harness.ctx);
    let resolved = resolver
        .resolve_text("Hello @john and @jane@example.com")
        .await
        .unwrap();

    // Email-shaped tokens resolve ahead of username-shaped ones
    let ids: Vec<_> = resolved.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![jane.id, john.id]);
}

#[tokio::test]
async fn username_resolution_is_case_insensitive() {
    let harness = TestHarness::new();
    let john = harness.seed_user("John", "john@example.com");

    let resolver = MentionResolver::new(&harness.ctx);
    let resolved = resolver.resolve_text("ping @JOHN").await.unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, john.id);
}

#[tokio::test]
async fn substring_fallback_picks_the_oldest_account() {
    let harness = TestHarness::new();
    // Seeded in id order, so john_smith has the lower id
    let john_smith = harness.seed_user("john_smith", "smith@example.com");
    harness.seed_user("johnny", "johnny@example.com");

    let resolver = MentionResolver::new(&harness.ctx);
    let resolved = resolver.resolve_text("hey @john").await.unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, john_smith.id);
}

#[tokio::test]
async fn exact_match_beats_the_substring_fallback() {
    let harness = TestHarness::new();
    harness.seed_user("john_smith", "smith@example.com");
    let john = harness.seed_user("john", "john@example.com");

    let resolver = MentionResolver::new(&harness.ctx);
    let resolved = resolver.resolve_text("hey @john").await.unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, john.id);
}

#[tokio::test]
async fn unresolvable_mentions_are_dropped_silently() {
    let harness = TestHarness::new();
    let john = harness.seed_user("john", "john@example.com");

    let resolver = MentionResolver::new(&harness.ctx);
    let resolved = resolver
        .resolve_text("cc @john and @nobody_here and @ghost@example.com")
        .await
        .unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, john.id);
}

#[tokio::test]
async fn one_user_mentioned_two_ways_resolves_once() {
    let harness = TestHarness::new();
    let john = harness.seed_user("john", "john@example.com");

    let resolver = MentionResolver::new(&harness.ctx);
    let resolved = resolver
        .resolve_text("both @john and @john@example.com")
        .await
        .unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, john.id);
}
