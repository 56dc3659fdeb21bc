//! Redis Pub/Sub module.
//!
//! Topic names come from `blog_core::Topic`; payloads are
//! `blog_core::StreamEvent` JSON.

mod publisher;
mod subscriber;

pub use publisher::Publisher;
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};
