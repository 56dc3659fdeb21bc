//! WebSocket close codes.
//!
//! The 4000 range is reserved for application codes. Clients inspect the
//! code to decide whether reconnecting is worthwhile.

use serde::{Deserialize, Serialize};

/// Application close codes sent when the gateway drops a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Something went wrong server-side
    UnknownError = 4000,
    /// Frame type or command the server does not understand
    UnknownCommand = 4001,
    /// Payload was not valid JSON, or not a known frame shape
    DecodeError = 4002,
    /// Credential on the handshake was invalid or expired
    AuthenticationFailed = 4004,
}

impl CloseCode {
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            4000 => Self::UnknownError,
            4001 => Self::UnknownCommand,
            4002 => Self::DecodeError,
            4004 => Self::AuthenticationFailed,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether a client may retry after receiving this code
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        !matches!(self, Self::AuthenticationFailed)
    }

    /// Human-readable reason carried in the close frame
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::UnknownCommand => "Unknown frame or command",
            Self::DecodeError => "Invalid payload encoding",
            Self::AuthenticationFailed => "Authentication failed",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}
