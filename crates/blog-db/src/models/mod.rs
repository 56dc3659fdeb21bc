//! Database models - SQLx-compatible structs for PostgreSQL tables
//!
//! Each model carries its entity conversion. Polymorphic (kind, id) columns
//! decode through `TryFrom` so an unknown discriminant surfaces as a domain
//! error instead of a panic.

mod comment;
mod notification;
mod post;
mod reaction;
mod tag;
mod user;

pub use comment::CommentModel;
pub use notification::NotificationModel;
pub use post::PostModel;
pub use reaction::ReactionModel;
pub use tag::TagModel;
pub use user::UserModel;
