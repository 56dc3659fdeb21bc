//! # blog-gateway
//!
//! WebSocket edge for the realtime layer: authenticates connections,
//! tracks topic subscriptions, and fans broker events out to clients.

pub mod auth;
pub mod channels;
pub mod connection;
pub mod dispatch;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, GatewayState};
