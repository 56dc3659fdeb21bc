//! One live WebSocket session
//!
//! Identity is fixed at handshake time; there is no in-band
//! authentication after the upgrade.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::auth::Identity;
use crate::protocol::ServerFrame;
use blog_core::value_objects::Snowflake;

/// Send side of one client session, shared with the registry
pub struct Connection {
    /// Random per-connection identifier
    session_id: String,

    /// Identity resolved at handshake
    identity: Identity,

    /// Channel to send frames to the WebSocket write task
    sender: mpsc::Sender<ServerFrame>,

    /// Highest sequence number handed out so far
    sequence: AtomicU64,
}

impl Connection {
    /// Wrap a fresh session; the identity never changes afterwards
    pub fn new(
        session_id: String,
        identity: Identity,
        sender: mpsc::Sender<ServerFrame>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            identity,
            sender,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The user behind this session, when authenticated
    pub fn user_id(&self) -> Option<Snowflake> {
        self.identity.user_id()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.identity.is_anonymous()
    }

    /// Claim the next per-connection sequence number, starting at 1
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Highest sequence number claimed so far
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Send a frame to this connection
    pub async fn send(
        &self,
        frame: ServerFrame,
    ) -> Result<(), mpsc::error::SendError<ServerFrame>> {
        self.sender.send(frame).await
    }

    /// Try to send a frame without blocking. A full buffer means the
    /// client is too slow; the frame is dropped for this connection only.
    pub fn try_send(
        &self,
        frame: ServerFrame,
    ) -> Result<(), mpsc::error::TrySendError<ServerFrame>> {
        self.sender.try_send(frame)
    }

}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("identity", &self.identity)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .finish()
    }
}
