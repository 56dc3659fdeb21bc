//! Stream publishing port
//!
//! Services publish through this trait so the broker backing (Redis in
//! production, in-memory in tests) stays swappable.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::events::StreamEvent;
use crate::value_objects::Topic;

/// Publishes stream events onto named topics
#[async_trait]
pub trait StreamPublisher: Send + Sync {
    /// Publish an event to a topic, returning the number of receivers that
    /// saw it
    async fn publish(&self, topic: &Topic, event: &StreamEvent) -> Result<u32, DomainError>;
}
