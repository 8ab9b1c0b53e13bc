//! Sentence chains: a head, a tail, and boundary flags.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CorpseError, CorpseResult};
use crate::fragment::{Fragment, FragmentId, Position};

/// Opaque unique identifier of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(String);

impl SentenceId {
    /// Generate a new random sentence ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SentenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SentenceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SentenceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Live state of one sentence chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentenceState {
    pub(crate) id: SentenceId,
    pub(crate) head_id: FragmentId,
    pub(crate) tail_id: FragmentId,
    pub(crate) has_beginning: bool,
    pub(crate) has_end: bool,
}

impl SentenceState {
    /// A one-fragment sentence whose flags follow the fragment's position.
    pub(crate) fn seeded(id: SentenceId, fragment_id: FragmentId, position: Position) -> Self {
        Self {
            id,
            head_id: fragment_id.clone(),
            tail_id: fragment_id,
            has_beginning: position == Position::Beginning,
            has_end: position == Position::End,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.has_beginning && self.has_end
    }
}

/// Sentences addressed by ID, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct SentenceRegistry {
    sentences: Vec<SentenceState>,
    index: HashMap<SentenceId, usize>,
}

impl SentenceRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a sentence. Returns false if the ID is already taken.
    pub(crate) fn insert(&mut self, sentence: SentenceState) -> bool {
        if self.index.contains_key(&sentence.id) {
            return false;
        }
        self.index.insert(sentence.id.clone(), self.sentences.len());
        self.sentences.push(sentence);
        true
    }

    pub(crate) fn require(&self, id: &SentenceId) -> CorpseResult<&SentenceState> {
        self.index
            .get(id)
            .map(|&i| &self.sentences[i])
            .ok_or_else(|| CorpseError::SentenceNotFound(id.clone()))
    }

    pub(crate) fn require_mut(&mut self, id: &SentenceId) -> CorpseResult<&mut SentenceState> {
        self.index
            .get(id)
            .map(|&i| &mut self.sentences[i])
            .ok_or_else(|| CorpseError::SentenceNotFound(id.clone()))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SentenceState> {
        self.sentences.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.sentences.len()
    }

    /// True when at least one sentence exists and all of them are complete.
    pub(crate) fn all_complete(&self) -> bool {
        !self.sentences.is_empty() && self.sentences.iter().all(SentenceState::is_complete)
    }

    pub(crate) fn clear(&mut self) {
        self.sentences.clear();
        self.index.clear();
    }
}

/// A finished sentence, read head to tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSentence {
    /// The sentence ID.
    pub id: SentenceId,
    /// Copies of the fragments in reading order.
    pub fragments: Vec<Fragment>,
    /// Fragment contents joined without a separator.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(id: &str, beginning: bool, end: bool) -> SentenceState {
        SentenceState {
            id: SentenceId::from(id),
            head_id: FragmentId::from("h"),
            tail_id: FragmentId::from("t"),
            has_beginning: beginning,
            has_end: end,
        }
    }

    #[test]
    fn seeded_flags_follow_position() {
        let s = SentenceState::seeded(SentenceId::new(), FragmentId::from("f"), Position::Beginning);
        assert!(s.has_beginning);
        assert!(!s.has_end);
        assert_eq!(s.head_id, s.tail_id);

        let s = SentenceState::seeded(SentenceId::new(), FragmentId::from("f"), Position::End);
        assert!(!s.has_beginning);
        assert!(s.has_end);

        let s = SentenceState::seeded(SentenceId::new(), FragmentId::from("f"), Position::Middle);
        assert!(!s.has_beginning && !s.has_end);
    }

    #[test]
    fn empty_registry_is_not_complete() {
        assert!(!SentenceRegistry::new().all_complete());
    }

    #[test]
    fn all_complete_requires_every_sentence() {
        let mut reg = SentenceRegistry::new();
        reg.insert(sentence("a", true, true));
        assert!(reg.all_complete());
        reg.insert(sentence("b", true, false));
        assert!(!reg.all_complete());
        reg.require_mut(&SentenceId::from("b")).unwrap().has_end = true;
        assert!(reg.all_complete());
    }

    #[test]
    fn duplicate_sentence_rejected() {
        let mut reg = SentenceRegistry::new();
        assert!(reg.insert(sentence("a", false, false)));
        assert!(!reg.insert(sentence("a", true, true)));
        assert_eq!(reg.len(), 1);
        assert!(!reg.require(&SentenceId::from("a")).unwrap().has_beginning);
    }

    #[test]
    fn missing_sentence_is_an_error() {
        let reg = SentenceRegistry::new();
        assert!(matches!(
            reg.require(&SentenceId::from("zz")),
            Err(CorpseError::SentenceNotFound(_))
        ));
    }
}
