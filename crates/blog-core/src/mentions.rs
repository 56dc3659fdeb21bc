//! Mention extraction engine
//!
//! Pure function over a text blob. Two token grammars run in a fixed order:
//! email-shaped mentions first (`@local@domain.tld`), then username-shaped
//! mentions (`@name`, 3-30 word characters). Every email match is erased
//! from the working copy before the username pass so an email's local part
//! is never re-matched as a bare username.

use std::sync::LazyLock;

use regex::Regex;

/// `@local@domain.tld` - the domain requires a dot followed by at least two
/// letters.
static EMAIL_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})")
        .expect("email mention pattern is valid")
});

/// `@name` with 3-30 alphanumeric/underscore characters.
static USERNAME_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]{3,30})\b").expect("username mention pattern is valid"));

/// Which grammar a token matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    Email,
    Username,
}

/// A raw mention token lifted from text, before identity resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionToken {
    pub raw: String,
    pub kind: MentionKind,
}

impl MentionToken {
    fn email(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: MentionKind::Email,
        }
    }

    fn username(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: MentionKind::Username,
        }
    }
}

/// Extract mention tokens from a text blob.
///
/// Output is deduplicated and ordered by first occurrence, with all
/// email-shaped tokens ahead of username-shaped ones (the email pass runs
/// first and consumes its matches).
#[must_use]
pub fn extract_mentions(text: &str) -> Vec<MentionToken> {
    let mut tokens: Vec<MentionToken> = Vec::new();
    let mut working = text.to_string();

    for captures in EMAIL_MENTION.captures_iter(text) {
        let raw = &captures[1];
        if !tokens.iter().any(|t| t.raw == raw) {
            tokens.push(MentionToken::email(raw));
        }
    }

    // Blank out every email match (ASCII, so a same-length space fill keeps
    // the byte offsets of the rest of the text intact).
    for found in EMAIL_MENTION.find_iter(text) {
        working.replace_range(found.range(), &" ".repeat(found.len()));
    }

    for captures in USERNAME_MENTION.captures_iter(&working) {
        let whole = captures.get(0).expect("match exists");
        if !is_word_bounded(&working, whole.start()) {
            continue;
        }
        let raw = &captures[1];
        if !tokens.iter().any(|t| t.raw == raw) {
            tokens.push(MentionToken::username(raw));
        }
    }

    tokens
}

/// A username mention only counts when its marker starts a word: the byte
/// before the `@` must not be a word character or another `@`.
fn is_word_bounded(text: &str, marker_index: usize) -> bool {
    match text[..marker_index].bytes().next_back() {
        None => true,
        Some(b) => !(b.is_ascii_alphanumeric() || b == b'_' || b == b'@'),
    }
}
