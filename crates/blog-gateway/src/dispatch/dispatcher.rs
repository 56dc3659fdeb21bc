//! Event dispatcher
//!
//! Bridges the Redis broker to the local stream registry. The broker
//! subscription set follows the registry: a topic is watched while at
//! least one local session is subscribed to it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::TopicWatcher;
use crate::connection::StreamRegistry;
use blog_broker::{ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError};
use blog_core::value_objects::Topic;

/// Routes broker events to locally subscribed WebSocket connections
pub struct EventDispatcher {
    registry: Arc<StreamRegistry>,
    subscriber: Subscriber,
}

impl EventDispatcher {
    /// Connect to the broker and start pumping events into the registry
    pub async fn new(
        config: SubscriberConfig,
        registry: Arc<StreamRegistry>,
    ) -> Result<Self, SubscriberError> {
        let subscriber = SubscriberBuilder::new()
            .redis_url(&config.redis_url)
            .broadcast_buffer(config.broadcast_buffer)
            .reconnect_delay_ms(config.reconnect_delay_ms)
            .build()
            .await?;

        tokio::spawn(pump(subscriber.receiver(), registry.clone()));
        tracing::info!("Event dispatcher started");

        Ok(Self {
            registry,
            subscriber,
        })
    }
}

#[async_trait]
impl TopicWatcher for EventDispatcher {
    async fn watch(&self, topic: Topic) -> Result<(), SubscriberError> {
        self.subscriber.subscribe(&[topic]).await
    }

    /// Drops the broker subscription only when the registry shows no
    /// remaining local interest
    async fn unwatch_if_unused(&self, topic: Topic) -> Result<(), SubscriberError> {
        if self.registry.subscriber_count(topic) == 0 {
            self.subscriber.unsubscribe(&[topic]).await?;
        }
        Ok(())
    }
}

/// Drain broker messages into the registry until the subscriber goes away
async fn pump(mut receiver: broadcast::Receiver<ReceivedMessage>, registry: Arc<StreamRegistry>) {
    loop {
        match receiver.recv().await {
            Ok(msg) => {
                deliver(&msg, &registry);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(dropped = n, "Event dispatcher fell behind the broker");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Event dispatcher loop ended");
                return;
            }
        }
    }
}

/// Hand one broker message to the registry; returns how many sessions got it
fn deliver(msg: &ReceivedMessage, registry: &StreamRegistry) -> usize {
    let Some(topic) = msg.topic else {
        tracing::debug!(payload = %msg.payload, "Message on unknown topic, ignoring");
        return 0;
    };
    let Some(event) = &msg.event else {
        tracing::debug!(topic = %topic.name(), "Non-event payload, ignoring");
        return 0;
    };

    let sent = registry.publish(topic, event);
    tracing::trace!(
        topic = %topic.name(),
        event_type = %event.event_type,
        sent = sent,
        "Event dispatched"
    );
    sent
}
