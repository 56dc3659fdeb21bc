//! The publishing half of the broker.
//!
//! Publishes stream events onto topic-named Redis channels for
//! distribution to every subscribed gateway instance.

use async_trait::async_trait;
use blog_core::{DomainError, StreamEvent, StreamPublisher, Topic};
use redis::AsyncCommands;

use crate::pool::{RedisPool, RedisResult};

/// Redis-backed stream publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event to a topic, returning the receiver count
    pub async fn publish_event(&self, topic: &Topic, event: &StreamEvent) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let topic_name = topic.name();
        let payload = event.to_json()?;

        let receivers: u32 = conn.publish(&topic_name, &payload).await?;

        tracing::debug!(
            topic = %topic_name,
            event_type = %event.event_type,
            receivers = receivers,
            "Event published to broker"
        );

        Ok(receivers)
    }
}

#[async_trait]
impl StreamPublisher for Publisher {
    async fn publish(&self, topic: &Topic, event: &StreamEvent) -> Result<u32, DomainError> {
        self.publish_event(topic, event)
            .await
            .map_err(|e| DomainError::BrokerError(e.to_string()))
    }
}
