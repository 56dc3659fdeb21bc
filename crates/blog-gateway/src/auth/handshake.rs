//! Handshake authentication
//!
//! Resolves a connection's identity before the WebSocket upgrade. The
//! credential arrives either as a `token` query parameter or as one
//! `token-<jwt>` tag inside the Sec-WebSocket-Protocol header; the query
//! parameter wins when both are present.
//!
//! Policy: no credential is fine (anonymous), a bad credential is not
//! (hard reject), and a valid credential for a user that no longer exists
//! degrades to anonymous.

use std::sync::Arc;

use blog_common::auth::TokenVerifier;
use blog_common::AppError;
use blog_core::traits::UserRepository;
use blog_core::value_objects::Snowflake;
use tracing::{debug, instrument};

/// Protocol tag prefix carrying the credential
const TOKEN_PROTOCOL_PREFIX: &str = "token-";

/// Who a connection speaks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// No identity; public channels only
    Anonymous,
    /// An authenticated user
    User(Snowflake),
}

impl Identity {
    /// The user id, if authenticated
    #[must_use]
    pub fn user_id(&self) -> Option<Snowflake> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }

    /// Whether this identity is anonymous
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Extract the credential from a Sec-WebSocket-Protocol header value.
/// The header is a comma-separated tag list; the first `token-` tag wins.
#[must_use]
pub fn credential_from_protocols(header: &str) -> Option<&str> {
    header
        .split(',')
        .map(str::trim)
        .find_map(|tag| tag.strip_prefix(TOKEN_PROTOCOL_PREFIX))
        .filter(|token| !token.is_empty())
}

/// Handshake authenticator
pub struct HandshakeAuth {
    verifier: Arc<TokenVerifier>,
    users: Arc<dyn UserRepository>,
}

impl HandshakeAuth {
    /// Create a new HandshakeAuth
    pub fn new(verifier: Arc<TokenVerifier>, users: Arc<dyn UserRepository>) -> Self {
        Self { verifier, users }
    }

    /// Resolve the identity for a connection attempt.
    ///
    /// # Errors
    /// Returns the verification error when a credential is present but
    /// invalid, expired, or malformed. The caller must refuse the
    /// connection in that case.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        query_token: Option<&str>,
        protocol_header: Option<&str>,
    ) -> Result<Identity, AppError> {
        let credential = query_token
            .filter(|t| !t.is_empty())
            .or_else(|| protocol_header.and_then(credential_from_protocols));

        let Some(credential) = credential else {
            return Ok(Identity::Anonymous);
        };

        let claims = self.verifier.verify(credential)?;
        let user_id = claims.user_id()?;

        // A token may outlive its account; fall back to anonymous
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Ok(Identity::User(user.id)),
            Ok(None) => {
                debug!(user_id = %user_id, "Credential references missing user");
                Ok(Identity::Anonymous)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for HandshakeAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeAuth").finish_non_exhaustive()
    }
}
