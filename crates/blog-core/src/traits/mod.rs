mod repositories;
mod stream;

pub use repositories::{
    CommentRepository, CounterCacheMaintainer, CounterRecomputeReport, NotificationRepository,
    PostRepository, ReactionRepository, RepoResult, TagRepository, UserRepository,
};
pub use stream::StreamPublisher;
