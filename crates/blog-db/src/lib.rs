//! # blog-db
//!
//! Database layer implementing the repository traits from `blog-core` with
//! PostgreSQL via SQLx.
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives and entity conversions
//! - Repository implementations, including the counter cache maintainer

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::{
    PgCommentRepository, PgCounterCacheMaintainer, PgNotificationRepository, PgPostRepository,
    PgReactionRepository, PgTagRepository, PgUserRepository,
};
