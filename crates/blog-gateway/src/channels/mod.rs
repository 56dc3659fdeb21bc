//! Subscribable channels
//!
//! The three channel variants share one capability set: react to
//! subscribe/unsubscribe and handle channel-scoped client commands. Each
//! channel owns a disjoint slice of the topic space, so leaving a channel
//! can drop exactly the topics joined through it.

mod feed;
mod notification;
mod thread;

pub use feed::FeedChannel;
pub use notification::NotificationChannel;
pub use thread::ThreadChannel;

use async_trait::async_trait;
use tracing::warn;

use crate::connection::{Connection, StreamRegistry};
use crate::dispatch::TopicWatcher;
use crate::protocol::{ChannelCommand, ChannelKind};
use blog_core::value_objects::Topic;
use blog_service::{ServiceContext, ServiceError};

/// Shared dependencies channels operate on
pub struct ChannelContext<'a> {
    pub registry: &'a StreamRegistry,
    pub dispatcher: &'a dyn TopicWatcher,
    pub services: &'a ServiceContext,
}

/// Errors a channel operation can produce
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel requires a non-anonymous identity
    #[error("authentication required")]
    AuthenticationRequired,

    /// The command is not part of this channel's vocabulary
    #[error("unsupported command for channel {0}")]
    UnsupportedCommand(ChannelKind),

    /// A delegated service call failed
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ChannelError {
    /// Error code for the client-facing error frame
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::UnsupportedCommand(_) => "UNSUPPORTED_COMMAND",
            Self::Service(_) => "SERVICE_ERROR",
        }
    }
}

/// A subscribable channel
#[async_trait]
pub trait Channel: Send + Sync {
    /// Which channel this is
    fn kind(&self) -> ChannelKind;

    /// Called when a connection subscribes to the channel
    async fn on_subscribe(
        &self,
        ctx: &ChannelContext<'_>,
        conn: &Connection,
    ) -> Result<(), ChannelError>;

    /// Called when a connection unsubscribes; drops every topic joined
    /// through this channel
    async fn on_unsubscribe(&self, ctx: &ChannelContext<'_>, conn: &Connection);

    /// Handle a channel-scoped client command
    async fn handle_message(
        &self,
        ctx: &ChannelContext<'_>,
        conn: &Connection,
        command: ChannelCommand,
    ) -> Result<(), ChannelError>;
}

/// Look up the channel implementation for a kind
#[must_use]
pub fn channel(kind: ChannelKind) -> &'static dyn Channel {
    static FEED: FeedChannel = FeedChannel;
    static THREAD: ThreadChannel = ThreadChannel;
    static NOTIFICATION: NotificationChannel = NotificationChannel;

    match kind {
        ChannelKind::Feed => &FEED,
        ChannelKind::Thread => &THREAD,
        ChannelKind::Notification => &NOTIFICATION,
    }
}

/// Join a topic locally and make sure the broker watches it
pub(crate) async fn join_topic(ctx: &ChannelContext<'_>, conn: &Connection, topic: Topic) {
    ctx.registry.subscribe(conn.session_id(), topic);
    if let Err(err) = ctx.dispatcher.watch(topic).await {
        warn!(topic = %topic.name(), error = %err, "Broker watch failed");
    }
}

/// Leave a topic locally and release the broker subscription if unused
pub(crate) async fn leave_topic(ctx: &ChannelContext<'_>, conn: &Connection, topic: Topic) {
    ctx.registry.unsubscribe(conn.session_id(), topic);
    if let Err(err) = ctx.dispatcher.unwatch_if_unused(topic).await {
        warn!(topic = %topic.name(), error = %err, "Broker unwatch failed");
    }
}

/// Leave every currently joined topic matching `owned`
pub(crate) async fn leave_matching(
    ctx: &ChannelContext<'_>,
    conn: &Connection,
    owned: fn(&Topic) -> bool,
) {
    for topic in ctx.registry.topics_of(conn.session_id()) {
        if owned(&topic) {
            leave_topic(ctx, conn, topic).await;
        }
    }
}
