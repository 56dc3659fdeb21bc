//! Domain entities

mod comment;
mod notification;
mod post;
mod reaction;
mod tag;
mod user;

pub use comment::Comment;
pub use notification::{Notification, NotificationKind};
pub use post::Post;
pub use reaction::{Reaction, ReactionKind};
pub use tag::Tag;
pub use user::User;
