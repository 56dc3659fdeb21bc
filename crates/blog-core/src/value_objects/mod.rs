//! Value objects - immutable domain primitives

mod snowflake;
mod targets;
mod topic;

pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use targets::{CommentTarget, NotifiableRef, ReactionTarget, TargetParseError};
pub use topic::Topic;
