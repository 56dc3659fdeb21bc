//! # blog-core
//!
//! Domain layer for the realtime broadcast & notification subsystem:
//! entities, value objects, the mention extraction engine, and the ports
//! (repository and stream traits) the infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, web
//! framework, broker, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod mentions;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Comment, Notification, NotificationKind, Post, Reaction, ReactionKind, Tag, User,
};
pub use error::DomainError;
pub use events::{StreamEvent, StreamEventType};
pub use mentions::{extract_mentions, MentionKind, MentionToken};
pub use traits::{
    CommentRepository, CounterCacheMaintainer, CounterRecomputeReport, NotificationRepository,
    PostRepository, ReactionRepository, RepoResult, StreamPublisher, TagRepository,
    UserRepository,
};
pub use value_objects::{
    CommentTarget, NotifiableRef, ReactionTarget, Snowflake, SnowflakeGenerator,
    SnowflakeParseError, TargetParseError, Topic,
};
