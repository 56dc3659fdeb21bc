//! Gateway integration tests
//!
//! Handshake credential policy against a real token verifier, plus stream
//! registry delivery semantics from the broker side of the fan-out.

use std::sync::Arc;

use tokio::sync::mpsc;

use blog_common::auth::TokenVerifier;
use blog_core::entities::NotificationKind;
use blog_core::events::{StreamEvent, StreamEventType};
use blog_core::value_objects::{NotifiableRef, Snowflake, Topic};
use blog_gateway::auth::{HandshakeAuth, Identity};
use blog_gateway::connection::{Connection, StreamRegistry};
use blog_gateway::protocol::ServerFrame;
use blog_service::NotificationService;
use integration_tests::{InMemoryUserRepository, TestHarness};

fn handshake_auth(harness: &TestHarness, verifier: TokenVerifier) -> HandshakeAuth {
    HandshakeAuth::new(
        Arc::new(verifier),
        Arc::new(InMemoryUserRepository::new(harness.backend.clone())),
    )
}

// ============================================================================
// Handshake policy
// ============================================================================

#[tokio::test]
async fn missing_credential_connects_anonymously() {
    let harness = TestHarness::new();
    let auth = handshake_auth(&harness, TokenVerifier::new("secret", 3600));

    let identity = auth.authenticate(None, None).await.unwrap();
    assert!(identity.is_anonymous());
}

#[tokio::test]
async fn valid_token_binds_the_user() {
    let harness = TestHarness::new();
    let user = harness.seed_user("alice", "alice@example.com");

    let verifier = TokenVerifier::new("secret", 3600);
    let token = verifier.issue_token(user.id).unwrap();
    let auth = handshake_auth(&harness, verifier);

    let identity = auth.authenticate(Some(&token), None).await.unwrap();
    assert_eq!(identity, Identity::User(user.id));
}

#[tokio::test]
async fn garbage_token_is_refused_outright() {
    let harness = TestHarness::new();
    let auth = handshake_auth(&harness, TokenVerifier::new("secret", 3600));

    let result = auth.authenticate(Some("not-a-jwt"), None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn token_signed_with_another_secret_is_refused() {
    let harness = TestHarness::new();
    let user = harness.seed_user("alice", "alice@example.com");

    let other = TokenVerifier::new("other-secret", 3600);
    let token = other.issue_token(user.id).unwrap();
    let auth = handshake_auth(&harness, TokenVerifier::new("secret", 3600));

    let result = auth.authenticate(Some(&token), None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn token_for_a_deleted_user_falls_back_to_anonymous() {
    let harness = TestHarness::new();
    let verifier = TokenVerifier::new("secret", 3600);
    let token = verifier.issue_token(Snowflake::new(424242)).unwrap();
    let auth = handshake_auth(&harness, verifier);

    let identity = auth.authenticate(Some(&token), None).await.unwrap();
    assert!(identity.is_anonymous());
}

#[tokio::test]
async fn credential_arrives_via_the_protocol_header() {
    let harness = TestHarness::new();
    let user = harness.seed_user("alice", "alice@example.com");

    let verifier = TokenVerifier::new("secret", 3600);
    let token = verifier.issue_token(user.id).unwrap();
    let auth = handshake_auth(&harness, verifier);

    let header = format!("json, token-{token}");
    let identity = auth.authenticate(None, Some(&header)).await.unwrap();
    assert_eq!(identity, Identity::User(user.id));
}

#[tokio::test]
async fn query_token_wins_over_the_protocol_header() {
    let harness = TestHarness::new();
    let user = harness.seed_user("alice", "alice@example.com");

    let verifier = TokenVerifier::new("secret", 3600);
    let token = verifier.issue_token(user.id).unwrap();
    let auth = handshake_auth(&harness, verifier);

    // The header carries garbage; the query credential must be the one used
    let identity = auth
        .authenticate(Some(&token), Some("token-garbage"))
        .await
        .unwrap();
    assert_eq!(identity, Identity::User(user.id));
}

// ============================================================================
// Registry delivery
// ============================================================================

fn connect(
    registry: &StreamRegistry,
    session_id: &str,
    identity: Identity,
) -> (Arc<Connection>, mpsc::Receiver<ServerFrame>) {
    let (tx, rx) = mpsc::channel(8);
    let connection = Connection::new(session_id.to_string(), identity, tx);
    registry.register(connection.clone());
    (connection, rx)
}

#[tokio::test]
async fn unsubscribed_connection_stops_receiving() {
    let registry = StreamRegistry::new();
    let topic = Topic::PostComments(Snowflake::new(7));

    let (_a, mut rx_a) = connect(&registry, "a", Identity::Anonymous);
    let (_b, mut rx_b) = connect(&registry, "b", Identity::Anonymous);

    assert!(registry.subscribe("a", topic));
    assert!(registry.subscribe("b", topic));

    let event = StreamEvent::new(StreamEventType::CommentCreated, serde_json::json!({}));
    assert_eq!(registry.publish(topic, &event), 2);

    assert!(registry.unsubscribe("a", topic));
    assert_eq!(registry.publish(topic, &event), 1);

    // a saw only the first publish, b saw both
    assert!(rx_a.try_recv().is_ok());
    assert!(rx_a.try_recv().is_err());
    assert!(rx_b.try_recv().is_ok());
    assert!(rx_b.try_recv().is_ok());
}

#[tokio::test]
async fn disconnect_releases_every_subscription() {
    let registry = StreamRegistry::new();
    let feed = Topic::Feed;
    let thread = Topic::PostComments(Snowflake::new(7));

    let (_a, _rx) = connect(&registry, "a", Identity::Anonymous);
    registry.subscribe("a", feed);
    registry.subscribe("a", thread);

    let mut released = registry.disconnect("a");
    released.sort_by_key(Topic::name);
    assert_eq!(released.len(), 2);
    assert_eq!(registry.subscriber_count(feed), 0);
    assert_eq!(registry.subscriber_count(thread), 0);
    assert_eq!(registry.connection_count(), 0);
}

// ============================================================================
// End to end
// ============================================================================

/// A mention notification recorded by the service layer reaches a device
/// subscribed to the recipient's personal topic, with a per-connection
/// sequence number.
#[tokio::test]
async fn recorded_notification_reaches_a_subscribed_device() {
    let harness = TestHarness::new();
    let author = harness.seed_user("alice", "alice@example.com");
    let recipient = harness.seed_user("bob", "bob@example.com");
    let post = harness.seed_post(author.id, "For @bob", "read this");

    // Service side: mention fan-out records and publishes
    let service = NotificationService::new(&harness.ctx);
    let created = service
        .notify_mentions(author.id, NotifiableRef::Post(post.id), "For @bob")
        .await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].kind, NotificationKind::Mention);

    // Gateway side: the recipient has one device on their personal topic
    let registry = StreamRegistry::new();
    let topic = Topic::for_identity(recipient.id);
    let (_conn, mut rx) = connect(&registry, "device", Identity::User(recipient.id));
    assert!(registry.subscribe("device", topic));

    // Replay what the broker would deliver
    for event in harness.publisher.events_for(topic) {
        registry.publish(topic, &event);
    }

    let frame = rx.try_recv().unwrap();
    match frame {
        ServerFrame::Event {
            topic: name,
            seq,
            event,
        } => {
            assert_eq!(name, topic.name());
            assert_eq!(seq, 1);
            assert_eq!(event.event_type, StreamEventType::NotificationCreated);
        }
        other => panic!("expected event frame, got {other:?}"),
    }
}
