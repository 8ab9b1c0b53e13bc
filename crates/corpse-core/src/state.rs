//! Serialized game state and its validating restore.
//!
//! A serialized state is treated as untrusted. Restore rebuilds the game
//! from scratch and re-checks every link, ownership, openness set, and
//! flag before accepting it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{CorpseError, CorpseResult};
use crate::fragment::{
    Fragment, FragmentId, FragmentRecord, Position, ensure_content, sanitize_tokens,
};
use crate::game::CorpseGame;
use crate::preview::Direction;
use crate::sentence::{SentenceId, SentenceState};

/// One sentence as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSentence {
    /// The sentence ID.
    pub id: SentenceId,
    /// First fragment of the chain.
    pub head_id: FragmentId,
    /// Last fragment of the chain.
    pub tail_id: FragmentId,
    /// Whether the head is a beginning fragment.
    pub has_beginning: bool,
    /// Whether the tail is an end fragment.
    pub has_end: bool,
    /// Member fragments from head to tail.
    #[serde(rename = "snippetIds")]
    pub fragment_ids: Vec<FragmentId>,
}

/// The full persisted state of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedState {
    /// Whether every sentence was complete when saved.
    pub completed: bool,
    /// All fragments in creation order.
    pub fragments: Vec<Fragment>,
    /// All sentences in creation order.
    pub sentences: Vec<SerializedSentence>,
    /// Fragments open on their preceding side.
    pub preceding_open_ids: Vec<FragmentId>,
    /// Fragments open on their following side.
    pub following_open_ids: Vec<FragmentId>,
    /// The fragment most recently served as a challenge.
    pub last_served_fragment_id: Option<FragmentId>,
}

impl CorpseGame {
    /// Export the full state.
    pub fn serialize(&self) -> SerializedState {
        SerializedState {
            completed: self.completed(),
            fragments: self.fragments.iter().map(|r| r.fragment.clone()).collect(),
            sentences: self
                .sentences
                .iter()
                .map(|s| SerializedSentence {
                    id: s.id.clone(),
                    head_id: s.head_id.clone(),
                    tail_id: s.tail_id.clone(),
                    has_beginning: s.has_beginning,
                    has_end: s.has_end,
                    fragment_ids: self.chain_ids(s),
                })
                .collect(),
            preceding_open_ids: self.openness.preceding.to_vec(),
            following_open_ids: self.openness.following.to_vec(),
            last_served_fragment_id: self.last_served.clone(),
        }
    }

    /// Export the full state as pretty-printed JSON.
    pub fn to_json(&self) -> CorpseResult<String> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Build a game with default collaborators from a persisted state.
    pub fn deserialize(state: &SerializedState, config: GameConfig) -> CorpseResult<Self> {
        let mut game = Self::new(config);
        game.restore(state)?;
        Ok(game)
    }

    /// Build a game with default collaborators from persisted JSON.
    pub fn from_json(json: &str, config: GameConfig) -> CorpseResult<Self> {
        let state: SerializedState = serde_json::from_str(json)?;
        Self::deserialize(&state, config)
    }

    /// Replace this game's state with `state`, validating everything.
    ///
    /// The game is cleared first. On error it is left partially rebuilt
    /// and must be discarded.
    pub fn restore(&mut self, state: &SerializedState) -> CorpseResult<()> {
        self.clear();

        let ownership = build_ownership(&state.sentences)?;
        for data in &state.fragments {
            let sentence_id = ownership
                .get(&data.id)
                .cloned()
                .ok_or_else(|| CorpseError::NoOwningSentence(data.id.clone()))?;

            let fragment = Fragment {
                id: data.id.clone(),
                content: ensure_content(&data.content)?,
                position: data.position,
                tokens: sanitize_tokens(&data.tokens)?,
                previous_fragment_id: data.previous_fragment_id.clone(),
                next_fragment_id: data.next_fragment_id.clone(),
            };
            if !fragment.position_consistent() {
                return Err(CorpseError::PositionConflict(fragment.id));
            }
            if !self.fragments.insert(FragmentRecord {
                fragment,
                sentence_id,
            }) {
                return Err(CorpseError::DuplicateFragment(data.id.clone()));
            }
        }

        for sentence in &state.sentences {
            self.validate_sentence(sentence)?;
            let inserted = self.sentences.insert(SentenceState {
                id: sentence.id.clone(),
                head_id: sentence.head_id.clone(),
                tail_id: sentence.tail_id.clone(),
                has_beginning: sentence.has_beginning,
                has_end: sentence.has_end,
            });
            if !inserted {
                return Err(CorpseError::DuplicateSentence(sentence.id.clone()));
            }
        }

        self.rebuild_openness(state)?;

        if let Some(id) = &state.last_served_fragment_id {
            if !self.fragments.contains(id) {
                return Err(CorpseError::UnknownLastServed(id.clone()));
            }
        }
        self.last_served = state.last_served_fragment_id.clone();

        let actual = self.completed();
        if state.completed != actual {
            return Err(CorpseError::CompletionMismatch {
                stored: state.completed,
                actual,
            });
        }

        tracing::debug!(
            fragments = self.fragment_count(),
            sentences = self.sentence_count(),
            completed = actual,
            "restored game state"
        );
        Ok(())
    }

    /// Check that a persisted sentence's member list matches the links.
    fn validate_sentence(&self, sentence: &SerializedSentence) -> CorpseResult<()> {
        let ids = &sentence.fragment_ids;
        let (Some(first), Some(last)) = (ids.first(), ids.last()) else {
            return Err(CorpseError::EmptySentence(sentence.id.clone()));
        };
        if *first != sentence.head_id {
            return Err(CorpseError::BadHeadId(sentence.id.clone()));
        }
        if *last != sentence.tail_id {
            return Err(CorpseError::BadTailId(sentence.id.clone()));
        }

        for (index, id) in ids.iter().enumerate() {
            let record = self.fragments.get(id).ok_or_else(|| CorpseError::UnknownMember {
                sentence: sentence.id.clone(),
                fragment: id.clone(),
            })?;
            if record.sentence_id != sentence.id {
                return Err(CorpseError::OwnershipMismatch {
                    sentence: sentence.id.clone(),
                    fragment: id.clone(),
                });
            }

            let fragment = &record.fragment;
            if index == 0 && fragment.previous_fragment_id.is_some() {
                return Err(CorpseError::HeadHasPredecessor {
                    sentence: sentence.id.clone(),
                    fragment: id.clone(),
                });
            }
            if index == ids.len() - 1 && fragment.next_fragment_id.is_some() {
                return Err(CorpseError::TailHasSuccessor {
                    sentence: sentence.id.clone(),
                    fragment: id.clone(),
                });
            }

            if let Some(next_id) = ids.get(index + 1) {
                if fragment.next_fragment_id.as_ref() != Some(next_id) {
                    return Err(CorpseError::BrokenForwardLink {
                        sentence: sentence.id.clone(),
                        fragment: id.clone(),
                    });
                }
                let points_back = self
                    .fragments
                    .get(next_id)
                    .is_some_and(|next| next.fragment.previous_fragment_id.as_ref() == Some(id));
                if !points_back {
                    return Err(CorpseError::BrokenBackwardLink {
                        sentence: sentence.id.clone(),
                        fragment: id.clone(),
                    });
                }
            }
        }

        let head_is_beginning = self
            .fragments
            .get(first)
            .is_some_and(|r| r.fragment.position == Position::Beginning);
        let tail_is_end = self
            .fragments
            .get(last)
            .is_some_and(|r| r.fragment.position == Position::End);
        if head_is_beginning != sentence.has_beginning || tail_is_end != sentence.has_end {
            return Err(CorpseError::BoundaryFlagMismatch(sentence.id.clone()));
        }

        Ok(())
    }

    /// Recompute openness, compare with the persisted sets, then adopt
    /// the persisted order.
    fn rebuild_openness(&mut self, state: &SerializedState) -> CorpseResult<()> {
        for record in self.fragments.iter() {
            self.openness.refresh(&record.fragment);
        }

        self.openness
            .preceding
            .check_matches(&state.preceding_open_ids, Direction::Preceding)?;
        self.openness
            .following
            .check_matches(&state.following_open_ids, Direction::Following)?;

        self.openness.preceding = state.preceding_open_ids.iter().cloned().collect();
        self.openness.following = state.following_open_ids.iter().cloned().collect();
        Ok(())
    }
}

/// Map every listed fragment to its sentence, rejecting shared members.
fn build_ownership(
    sentences: &[SerializedSentence],
) -> CorpseResult<HashMap<FragmentId, SentenceId>> {
    let mut ownership = HashMap::new();
    for sentence in sentences {
        for id in &sentence.fragment_ids {
            if ownership.insert(id.clone(), sentence.id.clone()).is_some() {
                return Err(CorpseError::MultipleOwners(id.clone()));
            }
        }
    }
    Ok(ownership)
}
