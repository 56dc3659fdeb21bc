//! # blog-broker
//!
//! Redis pub/sub layer that carries stream events between service
//! instances and gateway processes. The `Publisher` pushes events onto
//! topic-named Redis channels; the `Subscriber` maintains one pub/sub
//! connection per process and fans received messages out over a broadcast
//! channel.

pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export pubsub types
pub use pubsub::{
    Publisher, ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};
