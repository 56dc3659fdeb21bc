//! Connection tracking
//!
//! A [`Connection`] is one WebSocket session; the [`StreamRegistry`] maps
//! topics to the sessions subscribed to them.

mod connection;
mod registry;

pub use connection::Connection;
pub use registry::StreamRegistry;
