//! # blog-service
//!
//! Application layer over the domain ports: publication services
//! (posts, comments, reactions), mention resolution, the notification
//! service, and counter maintenance. Services hold no infrastructure
//! directly; everything reaches the outside world through the trait
//! objects in [`services::ServiceContext`].

pub mod services;

pub use services::{
    CommentService, MaintenanceService, MentionResolver, NotificationService, PostService,
    ReactionService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
