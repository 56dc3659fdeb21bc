//! Wire protocol
//!
//! JSON frames exchanged over the WebSocket and the close codes used when
//! a connection has to be dropped.

mod close_codes;
mod messages;

pub use close_codes::CloseCode;
pub use messages::{ChannelCommand, ChannelKind, ClientFrame, ServerFrame};
