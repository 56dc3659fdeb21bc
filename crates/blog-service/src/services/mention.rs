//! Mention resolution
//!
//! Turns the raw tokens produced by the extraction engine into identities.
//! Email tokens resolve by exact address lookup. Username tokens resolve by
//! case-insensitive exact match first, then fall back to the first user
//! whose name contains the token as a substring.

use blog_core::entities::User;
use blog_core::mentions::{extract_mentions, MentionKind, MentionToken};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Mention resolver
pub struct MentionResolver<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MentionResolver<'a> {
    /// Create a new MentionResolver
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Scan `text` and resolve every mention to a user.
    ///
    /// Unresolvable tokens are dropped silently; a user mentioned several
    /// times (or via both address and name) appears once.
    #[instrument(skip(self, text))]
    pub async fn resolve_text(&self, text: &str) -> ServiceResult<Vec<User>> {
        let tokens = extract_mentions(text);
        self.resolve_tokens(&tokens).await
    }

    /// Resolve already-extracted tokens to users, deduplicated by id
    pub async fn resolve_tokens(&self, tokens: &[MentionToken]) -> ServiceResult<Vec<User>> {
        let mut users: Vec<User> = Vec::new();

        for token in tokens {
            let resolved = self.resolve_one(token).await?;
            if let Some(user) = resolved {
                if !users.iter().any(|u| u.id == user.id) {
                    users.push(user);
                }
            }
        }

        Ok(users)
    }

    async fn resolve_one(&self, token: &MentionToken) -> ServiceResult<Option<User>> {
        let user = match token.kind {
            MentionKind::Email => self.ctx.user_repo().find_by_email(&token.raw).await?,
            MentionKind::Username => {
                match self.ctx.user_repo().find_by_username(&token.raw).await? {
                    Some(user) => Some(user),
                    None => {
                        self.ctx
                            .user_repo()
                            .search_by_username_fragment(&token.raw)
                            .await?
                    }
                }
            }
        };

        Ok(user)
    }
}
