//! Broker to registry bridge

mod dispatcher;

pub use dispatcher::EventDispatcher;

use async_trait::async_trait;

use blog_broker::SubscriberError;
use blog_core::value_objects::Topic;

/// Broker-side topic interest, as the channel layer sees it.
///
/// Channels join and leave topics without knowing how the broker
/// subscription behind them is managed.
#[async_trait]
pub trait TopicWatcher: Send + Sync {
    /// Start receiving broker events for a topic. Idempotent.
    async fn watch(&self, topic: Topic) -> Result<(), SubscriberError>;

    /// Release the broker subscription when no local session needs it
    async fn unwatch_if_unused(&self, topic: Topic) -> Result<(), SubscriberError>;
}
