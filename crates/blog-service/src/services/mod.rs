//! Business logic services
//!
//! Orchestration of domain operations: creating publications, resolving
//! mentions, fanning out notifications, and publishing stream events.

pub mod comment;
pub mod context;
pub mod error;
pub mod maintenance;
pub mod mention;
pub mod notification;
pub mod post;
pub mod reaction;

// Re-export all services for convenience
pub use comment::CommentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use maintenance::MaintenanceService;
pub use mention::MentionResolver;
pub use notification::NotificationService;
pub use post::PostService;
pub use reaction::ReactionService;
