//! Repository implementations for PostgreSQL

mod comment;
mod counter_cache;
mod error;
mod notification;
mod post;
mod reaction;
mod tag;
mod user;

pub use comment::PgCommentRepository;
pub use counter_cache::PgCounterCacheMaintainer;
pub use notification::PgNotificationRepository;
pub use post::PgPostRepository;
pub use reaction::PgReactionRepository;
pub use tag::PgTagRepository;
pub use user::PgUserRepository;
