//! Bounded previews of a fragment's edge.
//!
//! A challenge never shows a whole fragment. For a preceding challenge the
//! player sees the start of the fragment, for a following challenge the
//! end. Two candidates are built, one bounded by tokens and one by
//! characters, and the shorter wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fragment::{Fragment, Token};

/// Which side of a fragment a reply must attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Attach before the fragment.
    Preceding,
    /// Attach after the fragment.
    Following,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preceding => write!(f, "preceding"),
            Self::Following => write!(f, "following"),
        }
    }
}

/// Build the preview of `fragment` shown for a challenge in `direction`.
pub fn build_preview(
    fragment: &Fragment,
    direction: Direction,
    max_tokens: usize,
    max_chars: usize,
) -> String {
    let (tokens_part, chars_part) = match direction {
        Direction::Preceding => (
            first_tokens(&fragment.tokens, max_tokens),
            first_chars(&fragment.content, max_chars),
        ),
        Direction::Following => (
            last_tokens(&fragment.tokens, max_tokens),
            last_chars(&fragment.content, max_chars),
        ),
    };
    pick_shorter(tokens_part, chars_part)
}

/// Join the surfaces of the first `max` tokens.
pub fn first_tokens(tokens: &[Token], max: usize) -> String {
    tokens
        .iter()
        .take(max)
        .map(|t| t.surface.as_str())
        .collect()
}

/// Join the surfaces of the last `max` tokens.
pub fn last_tokens(tokens: &[Token], max: usize) -> String {
    let start = tokens.len().saturating_sub(max);
    tokens[start..].iter().map(|t| t.surface.as_str()).collect()
}

/// The first `max` characters of `content`.
pub fn first_chars(content: &str, max: usize) -> String {
    content.chars().take(max).collect()
}

/// The last `max` characters of `content`.
pub fn last_chars(content: &str, max: usize) -> String {
    let count = content.chars().count();
    content.chars().skip(count.saturating_sub(max)).collect()
}

/// Prefer whichever candidate is no longer, ties going to the token preview.
/// An empty candidate always loses to a non-empty one.
pub fn pick_shorter(tokens_part: String, chars_part: String) -> String {
    if tokens_part.is_empty() {
        return chars_part;
    }
    if chars_part.is_empty() {
        return tokens_part;
    }
    if tokens_part.chars().count() <= chars_part.chars().count() {
        tokens_part
    } else {
        chars_part
    }
}
