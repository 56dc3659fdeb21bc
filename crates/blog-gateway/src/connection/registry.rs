//! Stream registry
//!
//! Maps topics to subscribed sessions and fans published events out to
//! them. Fan-out uses `try_send` so one slow client never delays the
//! others; a frame that does not fit in a client's buffer is dropped for
//! that client only.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use super::Connection;
use crate::protocol::ServerFrame;
use blog_core::events::StreamEvent;
use blog_core::value_objects::{Snowflake, Topic};

/// Topic subscription registry for all live connections
pub struct StreamRegistry {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// Topic to session IDs mapping
    topic_sessions: DashMap<Topic, HashSet<String>>,

    /// Session ID to topics mapping
    session_topics: DashMap<String, HashSet<Topic>>,
}

impl StreamRegistry {
    /// Create a new stream registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            topic_sessions: DashMap::new(),
            session_topics: DashMap::new(),
        }
    }

    /// Create a new stream registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connection
    pub fn register(&self, connection: Arc<Connection>) {
        let session_id = connection.session_id().to_string();
        self.connections.insert(session_id.clone(), connection);
        self.session_topics.insert(session_id.clone(), HashSet::new());

        tracing::debug!(session_id = %session_id, "Connection registered");
    }

    /// Subscribe a session to a topic. Idempotent; returns `false` when the
    /// session is unknown or was already subscribed.
    pub fn subscribe(&self, session_id: &str, topic: Topic) -> bool {
        if !self.connections.contains_key(session_id) {
            return false;
        }

        let newly_added = self
            .session_topics
            .entry(session_id.to_string())
            .or_default()
            .insert(topic);

        if newly_added {
            self.topic_sessions
                .entry(topic)
                .or_default()
                .insert(session_id.to_string());

            tracing::trace!(
                session_id = %session_id,
                topic = %topic.name(),
                "Session subscribed to topic"
            );
        }

        newly_added
    }

    /// Unsubscribe a session from a topic. Idempotent; returns `false`
    /// when the session was not subscribed.
    pub fn unsubscribe(&self, session_id: &str, topic: Topic) -> bool {
        let removed = self
            .session_topics
            .get_mut(session_id)
            .is_some_and(|mut topics| topics.remove(&topic));

        if removed {
            self.drop_session_from_topic(session_id, topic);

            tracing::trace!(
                session_id = %session_id,
                topic = %topic.name(),
                "Session unsubscribed from topic"
            );
        }

        removed
    }

    /// Remove one session from one topic's set, dropping the entry when it
    /// empties. Touches only the affected topic.
    fn drop_session_from_topic(&self, session_id: &str, topic: Topic) {
        self.topic_sessions.alter(&topic, |_, mut sessions| {
            sessions.remove(session_id);
            sessions
        });
        self.topic_sessions.remove_if(&topic, |_, sessions| sessions.is_empty());
    }

    /// Subscribe a session to the stable per-user topic for an identity
    pub fn subscribe_for_identity(&self, session_id: &str, user_id: Snowflake) -> bool {
        self.subscribe(session_id, Topic::for_identity(user_id))
    }

    /// Topics a session is currently subscribed to
    pub fn topics_of(&self, session_id: &str) -> Vec<Topic> {
        self.session_topics
            .get(session_id)
            .map(|topics| topics.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of sessions subscribed to a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topic_sessions
            .get(&topic)
            .map(|sessions| sessions.len())
            .unwrap_or(0)
    }

    /// Deliver an event to every session subscribed to `topic`. Returns
    /// the number of sessions the frame was handed to.
    pub fn publish(&self, topic: Topic, event: &StreamEvent) -> usize {
        let sessions: Vec<String> = self
            .topic_sessions
            .get(&topic)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();

        let topic_name = topic.name();
        let mut sent = 0;

        for session_id in sessions {
            let Some(connection) = self.connections.get(&session_id) else {
                continue;
            };

            let frame = ServerFrame::Event {
                topic: topic_name.clone(),
                seq: connection.next_sequence(),
                event: event.clone(),
            };

            match connection.try_send(frame) {
                Ok(()) => sent += 1,
                Err(err) => {
                    tracing::debug!(
                        session_id = %session_id,
                        topic = %topic_name,
                        error = %err,
                        "Dropped event for slow or closed connection"
                    );
                }
            }
        }

        tracing::trace!(topic = %topic_name, sent = sent, "Event fanned out");

        sent
    }

    /// Remove a connection and every subscription it held. Returns the
    /// topics the session was subscribed to.
    pub fn disconnect(&self, session_id: &str) -> Vec<Topic> {
        self.connections.remove(session_id);

        let topics: Vec<Topic> = self
            .session_topics
            .remove(session_id)
            .map(|(_, topics)| topics.into_iter().collect())
            .unwrap_or_default();

        for topic in &topics {
            self.drop_session_from_topic(session_id, *topic);
        }

        tracing::debug!(
            session_id = %session_id,
            topics = topics.len(),
            "Connection removed"
        );

        topics
    }

    /// Get a connection by session ID
    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.topic_sessions.len()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StreamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamRegistry")
            .field("connections", &self.connections.len())
            .field("topics", &self.topic_sessions.len())
            .finish()
    }
}
