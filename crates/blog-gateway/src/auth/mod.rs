//! Connection authentication

mod handshake;

pub use handshake::{credential_from_protocols, HandshakeAuth, Identity};
