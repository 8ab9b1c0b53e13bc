//! Fragments, their tokens, and the arena that owns them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CorpseError, CorpseResult};
use crate::sentence::SentenceId;

/// Opaque unique identifier of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    /// Generate a new random fragment ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FragmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FragmentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a fragment sits within its sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    /// Opens a sentence. Nothing may precede it.
    Beginning,
    /// Sits inside a sentence. Either side may still be open.
    Middle,
    /// Closes a sentence. Nothing may follow it.
    End,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginning => write!(f, "BEGINNING"),
            Self::Middle => write!(f, "MIDDLE"),
            Self::End => write!(f, "END"),
        }
    }
}

/// One token of a fragment's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as it appears in the text.
    pub surface: String,
}

impl Token {
    /// Create a token from its surface form.
    pub fn new(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
        }
    }
}

/// A unit of authored text with its tokens and chain links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Unique identifier.
    pub id: FragmentId,
    /// Trimmed, non-empty text.
    pub content: String,
    /// Boundary role within the sentence.
    pub position: Position,
    /// Non-empty token sequence of `content`.
    pub tokens: Vec<Token>,
    /// The fragment directly before this one, if linked.
    pub previous_fragment_id: Option<FragmentId>,
    /// The fragment directly after this one, if linked.
    pub next_fragment_id: Option<FragmentId>,
}

impl Fragment {
    /// Whether a fragment may still be attached before this one.
    pub fn is_preceding_open(&self) -> bool {
        self.previous_fragment_id.is_none() && self.position != Position::Beginning
    }

    /// Whether a fragment may still be attached after this one.
    pub fn is_following_open(&self) -> bool {
        self.next_fragment_id.is_none() && self.position != Position::End
    }

    /// Whether the position agrees with the links: a beginning has no
    /// predecessor and an end has no successor.
    pub fn position_consistent(&self) -> bool {
        match self.position {
            Position::Beginning => self.previous_fragment_id.is_none(),
            Position::End => self.next_fragment_id.is_none(),
            Position::Middle => true,
        }
    }
}

/// A fragment together with the sentence that owns it.
#[derive(Debug, Clone)]
pub(crate) struct FragmentRecord {
    pub(crate) fragment: Fragment,
    pub(crate) sentence_id: SentenceId,
}

/// Arena of fragment records addressed by ID, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct FragmentStore {
    records: Vec<FragmentRecord>,
    index: HashMap<FragmentId, usize>,
}

impl FragmentStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns false if the ID is already taken.
    pub(crate) fn insert(&mut self, record: FragmentRecord) -> bool {
        if self.index.contains_key(&record.fragment.id) {
            return false;
        }
        self.index
            .insert(record.fragment.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub(crate) fn get(&self, id: &FragmentId) -> Option<&FragmentRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub(crate) fn get_mut(&mut self, id: &FragmentId) -> Option<&mut FragmentRecord> {
        self.index.get(id).map(|&i| &mut self.records[i])
    }

    pub(crate) fn require(&self, id: &FragmentId) -> CorpseResult<&FragmentRecord> {
        self.get(id)
            .ok_or_else(|| CorpseError::FragmentNotFound(id.clone()))
    }

    pub(crate) fn require_mut(&mut self, id: &FragmentId) -> CorpseResult<&mut FragmentRecord> {
        self.get_mut(id)
            .ok_or_else(|| CorpseError::FragmentNotFound(id.clone()))
    }

    pub(crate) fn contains(&self, id: &FragmentId) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &FragmentRecord> {
        self.records.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

/// Trim content and reject it if nothing is left.
pub(crate) fn ensure_content(content: &str) -> CorpseResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CorpseError::EmptyContent);
    }
    Ok(trimmed.to_string())
}

/// Check a token sequence and return a copy with trimmed surfaces.
pub(crate) fn sanitize_tokens(tokens: &[Token]) -> CorpseResult<Vec<Token>> {
    if tokens.is_empty() {
        return Err(CorpseError::EmptyTokens);
    }
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let surface = token.surface.trim();
            if surface.is_empty() {
                Err(CorpseError::BlankToken { index })
            } else {
                Ok(Token::new(surface))
            }
        })
        .collect()
}
