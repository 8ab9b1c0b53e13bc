//! The exquisite corpse engine.
//!
//! `CorpseGame` owns the fragment store, the sentence registry, and the
//! openness index, and keeps the three consistent through every mutation.
//! All validation happens before anything is changed, so a failed call
//! leaves the game as it was.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collab::{RandomSource, SeededRandom, Tokenizer, WordTokenizer};
use crate::config::GameConfig;
use crate::error::{CorpseError, CorpseResult};
use crate::fragment::{
    Fragment, FragmentId, FragmentRecord, FragmentStore, Position, Token, ensure_content,
    sanitize_tokens,
};
use crate::openness::OpennessIndex;
use crate::preview::{Direction, build_preview};
use crate::sentence::{CompletedSentence, SentenceId, SentenceRegistry, SentenceState};

/// A prompt asking the player to extend a fragment in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// The fragment to extend.
    pub id: FragmentId,
    /// The visible edge of the fragment.
    pub content_part: String,
    /// The side the reply must attach to.
    pub direction: Direction,
}

/// Connection points on all fragments, and how many are still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Arms with no neighbor yet.
    pub open_arms: usize,
    /// All arms. Each non-beginning fragment has a preceding arm and each
    /// non-end fragment a following arm.
    pub total_arms: usize,
}

impl Progress {
    /// Arms that already have a neighbor.
    pub fn connected_arms(&self) -> usize {
        self.total_arms - self.open_arms
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingChallenge {
    fragment_id: FragmentId,
    direction: Direction,
}

/// A single-player exquisite corpse game.
///
/// Not safe for concurrent use. Callers must serialize access.
pub struct CorpseGame {
    pub(crate) config: GameConfig,
    pub(crate) fragments: FragmentStore,
    pub(crate) sentences: SentenceRegistry,
    pub(crate) openness: OpennessIndex,
    pub(crate) last_served: Option<FragmentId>,
    last_created: Option<FragmentId>,
    pending: Option<PendingChallenge>,
    random: Box<dyn RandomSource>,
    tokenizer: Box<dyn Tokenizer>,
}

impl fmt::Debug for CorpseGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorpseGame")
            .field("config", &self.config)
            .field("fragments", &self.fragments.len())
            .field("sentences", &self.sentences.len())
            .field("last_served", &self.last_served)
            .field("last_created", &self.last_created)
            .finish_non_exhaustive()
    }
}

impl CorpseGame {
    /// Create a game with the seeded random source and the word tokenizer.
    pub fn new(config: GameConfig) -> Self {
        let random = SeededRandom::new(config.seed);
        Self::with_collaborators(config, random, WordTokenizer)
    }

    /// Create a game with caller-supplied collaborators.
    pub fn with_collaborators(
        config: GameConfig,
        random: impl RandomSource + 'static,
        tokenizer: impl Tokenizer + 'static,
    ) -> Self {
        Self {
            config: config.normalised(),
            fragments: FragmentStore::new(),
            sentences: SentenceRegistry::new(),
            openness: OpennessIndex::new(),
            last_served: None,
            last_created: None,
            pending: None,
            random: Box::new(random),
            tokenizer: Box::new(tokenizer),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of fragments in the game.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Number of sentences in the game.
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// True when at least one sentence exists and every sentence has
    /// both a beginning and an end.
    pub fn completed(&self) -> bool {
        self.sentences.all_complete()
    }

    /// Look up a fragment by ID.
    pub fn get_fragment(&self, id: &FragmentId) -> Option<Fragment> {
        self.fragments.get(id).map(|r| r.fragment.clone())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Seed a new one-fragment sentence.
    ///
    /// Seeding is exempt from challenge enforcement and discards any
    /// outstanding challenge.
    pub fn add_fragment(&mut self, position: Position, content: &str) -> CorpseResult<Fragment> {
        self.pending = None;
        let content = ensure_content(content)?;
        let tokens = self.tokenize(&content)?;

        let id = FragmentId::new();
        let sentence_id = SentenceId::new();
        let fragment = Fragment {
            id: id.clone(),
            content,
            position,
            tokens,
            previous_fragment_id: None,
            next_fragment_id: None,
        };

        self.sentences
            .insert(SentenceState::seeded(sentence_id.clone(), id.clone(), position));
        self.openness.refresh(&fragment);
        self.fragments.insert(FragmentRecord {
            fragment: fragment.clone(),
            sentence_id,
        });
        self.last_created = Some(id.clone());

        tracing::debug!(fragment = %id, %position, "seeded fragment");
        Ok(fragment)
    }

    /// Attach a new fragment after `target_id`.
    ///
    /// The new fragment ends its sentence if its content ends with a
    /// configured punctuation mark, or if the ending draw succeeds. The
    /// draw is taken in either case, before the content is tokenized.
    pub fn add_following_fragment(
        &mut self,
        target_id: &FragmentId,
        content: &str,
    ) -> CorpseResult<Fragment> {
        let answers_challenge = self.check_challenge_response(target_id, Direction::Following)?;
        let content = ensure_content(content)?;

        let target = self.fragments.require(target_id)?;
        if target.fragment.next_fragment_id.is_some() {
            return Err(CorpseError::AlreadyHasSuccessor(target_id.clone()));
        }
        if target.fragment.position == Position::End {
            return Err(CorpseError::TerminalFragment(target_id.clone()));
        }
        let sentence_id = target.sentence_id.clone();
        self.sentences.require(&sentence_id)?;

        let ends_with_punctuation = self.config.ends_sentence(&content);
        let drawn_end = self.random.next_f64() < self.config.ending_probability;
        let position = if ends_with_punctuation || drawn_end {
            Position::End
        } else {
            Position::Middle
        };
        let tokens = self.tokenize(&content)?;

        if answers_challenge {
            self.pending = None;
        }

        let id = FragmentId::new();
        let fragment = Fragment {
            id: id.clone(),
            content,
            position,
            tokens,
            previous_fragment_id: Some(target_id.clone()),
            next_fragment_id: None,
        };

        let target = self.fragments.require_mut(target_id)?;
        target.fragment.next_fragment_id = Some(id.clone());
        self.openness.refresh(&target.fragment);

        let sentence = self.sentences.require_mut(&sentence_id)?;
        if sentence.tail_id == *target_id {
            sentence.tail_id = id.clone();
        }
        if position == Position::End {
            sentence.has_end = true;
        }

        self.openness.refresh(&fragment);
        self.fragments.insert(FragmentRecord {
            fragment: fragment.clone(),
            sentence_id,
        });
        self.last_created = Some(id.clone());

        tracing::debug!(fragment = %id, after = %target_id, %position, "appended fragment");
        Ok(fragment)
    }

    /// Attach a new fragment before `target_id`.
    ///
    /// The new fragment begins its sentence only if the beginning draw
    /// succeeds. Punctuation plays no part. The content is tokenized
    /// before the draw.
    pub fn add_preceding_fragment(
        &mut self,
        target_id: &FragmentId,
        content: &str,
    ) -> CorpseResult<Fragment> {
        let answers_challenge = self.check_challenge_response(target_id, Direction::Preceding)?;
        let content = ensure_content(content)?;

        let target = self.fragments.require(target_id)?;
        if target.fragment.previous_fragment_id.is_some() {
            return Err(CorpseError::AlreadyHasPredecessor(target_id.clone()));
        }
        if target.fragment.position == Position::Beginning {
            return Err(CorpseError::SentenceStart(target_id.clone()));
        }
        let sentence_id = target.sentence_id.clone();
        self.sentences.require(&sentence_id)?;

        let tokens = self.tokenize(&content)?;
        let position = if self.random.next_f64() < self.config.beginning_probability {
            Position::Beginning
        } else {
            Position::Middle
        };

        if answers_challenge {
            self.pending = None;
        }

        let id = FragmentId::new();
        let fragment = Fragment {
            id: id.clone(),
            content,
            position,
            tokens,
            previous_fragment_id: None,
            next_fragment_id: Some(target_id.clone()),
        };

        let target = self.fragments.require_mut(target_id)?;
        target.fragment.previous_fragment_id = Some(id.clone());
        self.openness.refresh(&target.fragment);

        let sentence = self.sentences.require_mut(&sentence_id)?;
        if sentence.head_id == *target_id {
            sentence.head_id = id.clone();
        }
        if position == Position::Beginning {
            sentence.has_beginning = true;
        }

        self.openness.refresh(&fragment);
        self.fragments.insert(FragmentRecord {
            fragment: fragment.clone(),
            sentence_id,
        });
        self.last_created = Some(id.clone());

        tracing::debug!(fragment = %id, before = %target_id, %position, "prepended fragment");
        Ok(fragment)
    }

    // -----------------------------------------------------------------------
    // Challenges
    // -----------------------------------------------------------------------

    /// Pick the next fragment and direction to present.
    ///
    /// Returns `None` once no incomplete sentence has an open side.
    pub fn get_next_challenge(&mut self) -> CorpseResult<Option<Challenge>> {
        let candidates = self.collect_candidates()?;
        if candidates.is_empty() {
            self.pending = None;
            return Ok(None);
        }

        let pool = exclude_with_fallback(candidates, self.last_served.as_ref(), "last served");
        let pool = exclude_with_fallback(pool, self.last_created.as_ref(), "last created");

        let index = pick_index(self.random.next_f64(), pool.len());
        let chosen = self.fragments.require(&pool[index])?.fragment.clone();

        let direction = match (chosen.is_preceding_open(), chosen.is_following_open()) {
            (true, true) => {
                if self.random.next_f64() < 0.5 {
                    Direction::Preceding
                } else {
                    Direction::Following
                }
            }
            (true, false) => Direction::Preceding,
            _ => Direction::Following,
        };

        let content_part = build_preview(
            &chosen,
            direction,
            self.config.max_tokens,
            self.config.max_chars,
        );

        self.last_served = Some(chosen.id.clone());
        self.pending = Some(PendingChallenge {
            fragment_id: chosen.id.clone(),
            direction,
        });

        tracing::debug!(fragment = %chosen.id, %direction, "served challenge");
        Ok(Some(Challenge {
            id: chosen.id,
            content_part,
            direction,
        }))
    }

    /// Open fragment IDs, preceding side first, whose sentence is unfinished.
    fn collect_candidates(&self) -> CorpseResult<Vec<FragmentId>> {
        let mut candidates: Vec<FragmentId> = Vec::new();
        for id in self.openness.preceding.iter().chain(self.openness.following.iter()) {
            if candidates.contains(id) {
                continue;
            }
            let record = self.fragments.require(id)?;
            if !self.sentences.require(&record.sentence_id)?.is_complete() {
                candidates.push(id.clone());
            }
        }
        Ok(candidates)
    }

    /// Reject a reply that extends the served fragment the wrong way.
    ///
    /// Returns whether the reply answers the outstanding challenge.
    fn check_challenge_response(
        &self,
        fragment_id: &FragmentId,
        direction: Direction,
    ) -> CorpseResult<bool> {
        match &self.pending {
            Some(pending) if pending.fragment_id == *fragment_id => {
                if pending.direction != direction {
                    return Err(CorpseError::DirectionMismatch {
                        fragment: fragment_id.clone(),
                        expected: pending.direction,
                        actual: direction,
                    });
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    // -----------------------------------------------------------------------
    // Progress and results
    // -----------------------------------------------------------------------

    /// Count open and total arms across all fragments.
    pub fn get_progress(&self) -> Progress {
        let mut progress = Progress {
            open_arms: 0,
            total_arms: 0,
        };
        for record in self.fragments.iter() {
            let f = &record.fragment;
            if f.position != Position::Beginning {
                progress.total_arms += 1;
                if f.previous_fragment_id.is_none() {
                    progress.open_arms += 1;
                }
            }
            if f.position != Position::End {
                progress.total_arms += 1;
                if f.next_fragment_id.is_none() {
                    progress.open_arms += 1;
                }
            }
        }
        progress
    }

    /// Every sentence read head to tail. Fails until the game is complete.
    pub fn get_completed_sentences(&self) -> CorpseResult<Vec<CompletedSentence>> {
        if !self.completed() {
            return Err(CorpseError::NotComplete);
        }
        self.sentences
            .iter()
            .map(|sentence| -> CorpseResult<CompletedSentence> {
                let fragments = self
                    .chain_ids(sentence)
                    .iter()
                    .map(|id| self.fragments.require(id).map(|r| r.fragment.clone()))
                    .collect::<CorpseResult<Vec<_>>>()?;
                let text = fragments.iter().map(|f| f.content.as_str()).collect();
                Ok(CompletedSentence {
                    id: sentence.id.clone(),
                    fragments,
                    text,
                })
            })
            .collect()
    }

    /// Fragment IDs of a sentence from head to tail.
    ///
    /// The walk stops at a dangling link and never visits more fragments
    /// than the store holds.
    pub(crate) fn chain_ids(&self, sentence: &SentenceState) -> Vec<FragmentId> {
        let mut ids = Vec::new();
        let mut current = Some(sentence.head_id.clone());
        while let Some(id) = current {
            if ids.len() >= self.fragments.len() {
                break;
            }
            let Some(record) = self.fragments.get(&id) else {
                break;
            };
            current = record.fragment.next_fragment_id.clone();
            ids.push(id);
        }
        ids
    }

    // -----------------------------------------------------------------------
    // Internals shared with restore
    // -----------------------------------------------------------------------

    fn tokenize(&self, content: &str) -> CorpseResult<Vec<Token>> {
        let tokens = self
            .tokenizer
            .tokenize(content)
            .map_err(CorpseError::TokenizerContract)?;
        sanitize_tokens(&tokens)
    }

    /// Drop every fragment, sentence, and transient pointer.
    pub(crate) fn clear(&mut self) {
        self.fragments.clear();
        self.sentences.clear();
        self.openness.clear();
        self.last_served = None;
        self.last_created = None;
        self.pending = None;
    }
}

/// Remove `excluded` from `candidates` unless that would leave nothing.
fn exclude_with_fallback(
    candidates: Vec<FragmentId>,
    excluded: Option<&FragmentId>,
    label: &str,
) -> Vec<FragmentId> {
    let Some(excluded) = excluded else {
        return candidates;
    };
    let filtered: Vec<FragmentId> = candidates
        .iter()
        .filter(|id| *id != excluded)
        .cloned()
        .collect();
    if filtered.is_empty() {
        tracing::debug!(fragment = %excluded, "only the {label} fragment is open, offering it again");
        return candidates;
    }
    filtered
}

/// Map a draw in `[0, 1)` onto an index below `len`.
fn pick_index(draw: f64, len: usize) -> usize {
    let scaled = (draw * len as f64).floor();
    if scaled.is_finite() && scaled > 0.0 {
        (scaled as usize).min(len - 1)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::collab::SequenceRandom;

    fn game(draws: &[f64]) -> CorpseGame {
        game_with(GameConfig::default(), draws)
    }

    fn game_with(config: GameConfig, draws: &[f64]) -> CorpseGame {
        CorpseGame::with_collaborators(config, SequenceRandom::new(draws.to_vec()), WordTokenizer)
    }

    // -- seeding --

    #[test]
    fn seed_creates_one_fragment_sentence() {
        let mut g = game(&[0.5]);
        let f = g.add_fragment(Position::Beginning, "  hello world ").unwrap();
        assert_eq!(f.content, "hello world");
        assert_eq!(f.position, Position::Beginning);
        assert_eq!(f.tokens, vec![Token::new("hello"), Token::new("world")]);
        assert_eq!(g.fragment_count(), 1);
        assert_eq!(g.sentence_count(), 1);
        assert!(!g.completed());
        assert_eq!(g.get_fragment(&f.id), Some(f));
    }

    #[test]
    fn seed_rejects_blank_content() {
        let mut g = game(&[0.5]);
        assert!(matches!(
            g.add_fragment(Position::Middle, "   "),
            Err(CorpseError::EmptyContent)
        ));
        assert_eq!(g.fragment_count(), 0);
        assert_eq!(g.sentence_count(), 0);
    }

    #[test]
    fn seeded_end_is_open_before() {
        let mut g = game(&[0.5]);
        let f = g.add_fragment(Position::End, "the end.").unwrap();
        assert_eq!(g.get_progress(), Progress { open_arms: 1, total_arms: 1 });
        assert!(g.get_fragment(&f.id).unwrap().is_preceding_open());
    }

    #[test]
    fn tokenizer_errors_surface() {
        let failing = |_: &str| -> Result<Vec<Token>, String> { Err("dictionary missing".into()) };
        let mut g = CorpseGame::with_collaborators(GameConfig::default(), SequenceRandom::default(), failing);
        assert!(matches!(
            g.add_fragment(Position::Middle, "x"),
            Err(CorpseError::TokenizerContract(msg)) if msg == "dictionary missing"
        ));

        let empty = |_: &str| -> Result<Vec<Token>, String> { Ok(Vec::new()) };
        let mut g = CorpseGame::with_collaborators(GameConfig::default(), SequenceRandom::default(), empty);
        assert!(matches!(g.add_fragment(Position::Middle, "x"), Err(CorpseError::EmptyTokens)));

        let blank = |_: &str| -> Result<Vec<Token>, String> { Ok(vec![Token::new("a"), Token::new(" ")]) };
        let mut g = CorpseGame::with_collaborators(GameConfig::default(), SequenceRandom::default(), blank);
        assert!(matches!(
            g.add_fragment(Position::Middle, "x"),
            Err(CorpseError::BlankToken { index: 1 })
        ));
        assert_eq!(g.fragment_count(), 0);
    }

    #[test]
    fn tokenizer_failure_and_draw_order() {
        let draws = Rc::new(Cell::new(0));
        let counter = Rc::clone(&draws);
        let random = move || {
            counter.set(counter.get() + 1);
            0.9
        };
        let picky = |s: &str| -> Result<Vec<Token>, String> {
            if s == "zzz" {
                Err("unknown word".into())
            } else {
                Ok(vec![Token::new(s)])
            }
        };
        let mut g = CorpseGame::with_collaborators(GameConfig::default(), random, picky);
        let head = g.add_fragment(Position::Beginning, "start").unwrap();
        let mid = g.add_fragment(Position::Middle, "mid").unwrap();

        // appending draws for the ending before tokenizing
        assert!(matches!(
            g.add_following_fragment(&head.id, "zzz"),
            Err(CorpseError::TokenizerContract(_))
        ));
        assert_eq!(draws.get(), 1);

        // prepending tokenizes before drawing for the beginning
        assert!(matches!(
            g.add_preceding_fragment(&mid.id, "zzz"),
            Err(CorpseError::TokenizerContract(_))
        ));
        assert_eq!(draws.get(), 1);

        assert_eq!(g.fragment_count(), 2);
        assert_eq!(g.get_fragment(&head.id).unwrap().next_fragment_id, None);
        assert_eq!(g.get_fragment(&mid.id).unwrap().previous_fragment_id, None);
    }

    #[test]
    fn debug_summarizes_the_game() {
        let mut g = game(&[0.5]);
        g.add_fragment(Position::Middle, "drifting").unwrap();
        let shown = format!("{g:?}");
        assert!(shown.starts_with("CorpseGame {"));
        assert!(shown.contains("fragments: 1"));
        assert!(shown.contains("sentences: 1"));
        assert!(shown.ends_with(".. }"));
    }

    #[test]
    fn tokens_are_trimmed() {
        let padded = |s: &str| -> Result<Vec<Token>, String> { Ok(vec![Token::new(format!(" {s} "))]) };
        let mut g = CorpseGame::with_collaborators(GameConfig::default(), SequenceRandom::default(), padded);
        let f = g.add_fragment(Position::Middle, "word").unwrap();
        assert_eq!(f.tokens, vec![Token::new("word")]);
    }

    // -- extending forward --

    #[test]
    fn following_links_both_fragments() {
        // 0.9 keeps the ending draw above the default 0.3
        let mut g = game(&[0.9]);
        let a = g.add_fragment(Position::Beginning, "once upon").unwrap();
        let b = g.add_following_fragment(&a.id, "a time").unwrap();
        assert_eq!(b.position, Position::Middle);
        assert_eq!(b.previous_fragment_id.as_ref(), Some(&a.id));
        assert_eq!(g.get_fragment(&a.id).unwrap().next_fragment_id, Some(b.id.clone()));
        assert_eq!(g.sentence_count(), 1);
    }

    #[test]
    fn punctuation_forces_end() {
        let mut g = game(&[0.9]);
        let a = g.add_fragment(Position::Beginning, "once upon").unwrap();
        let b = g.add_following_fragment(&a.id, "a time.").unwrap();
        assert_eq!(b.position, Position::End);
        assert!(g.completed());
    }

    #[test]
    fn ending_draw_is_taken_even_with_punctuation() {
        let mut g = game(&[0.9, 0.1]);
        let a = g.add_fragment(Position::Middle, "once").unwrap();
        let b = g.add_following_fragment(&a.id, "done!").unwrap();
        assert_eq!(b.position, Position::End);
        // 0.1 < 0.3 only if the appended fragment consumed the first draw
        let c = g.add_preceding_fragment(&a.id, "first").unwrap();
        assert_eq!(c.position, Position::Beginning);
    }

    #[test]
    fn ending_draw_can_force_end_without_punctuation() {
        let mut g = game(&[0.1]);
        let a = g.add_fragment(Position::Beginning, "once").unwrap();
        let b = g.add_following_fragment(&a.id, "and then").unwrap();
        assert_eq!(b.position, Position::End);
    }

    #[test]
    fn following_requires_existing_target() {
        let mut g = game(&[0.9]);
        assert!(matches!(
            g.add_following_fragment(&FragmentId::from("ghost"), "x"),
            Err(CorpseError::FragmentNotFound(_))
        ));
    }

    #[test]
    fn following_rejects_linked_target() {
        let mut g = game(&[0.9]);
        let a = g.add_fragment(Position::Beginning, "a").unwrap();
        g.add_following_fragment(&a.id, "b").unwrap();
        assert!(matches!(
            g.add_following_fragment(&a.id, "c"),
            Err(CorpseError::AlreadyHasSuccessor(_))
        ));
        assert_eq!(g.fragment_count(), 2);
    }

    #[test]
    fn following_rejects_end_target() {
        let mut g = game(&[0.9]);
        let e = g.add_fragment(Position::End, "fin.").unwrap();
        assert!(matches!(
            g.add_following_fragment(&e.id, "more"),
            Err(CorpseError::TerminalFragment(_))
        ));
    }

    // -- extending backward --

    #[test]
    fn preceding_moves_head() {
        let mut g = game(&[0.9]);
        let m = g.add_fragment(Position::Middle, "middle").unwrap();
        let p = g.add_preceding_fragment(&m.id, "start").unwrap();
        assert_eq!(p.position, Position::Middle);
        assert_eq!(p.next_fragment_id.as_ref(), Some(&m.id));
        let sentence = g.sentences.iter().next().unwrap();
        assert_eq!(sentence.head_id, p.id);
        assert_eq!(sentence.tail_id, m.id);
    }

    #[test]
    fn preceding_ignores_punctuation() {
        let mut g = game(&[0.9]);
        let m = g.add_fragment(Position::End, "end.").unwrap();
        let p = g.add_preceding_fragment(&m.id, "Stop.").unwrap();
        assert_eq!(p.position, Position::Middle);
    }

    #[test]
    fn beginning_draw_completes_sentence() {
        let mut g = game(&[0.0]);
        let e = g.add_fragment(Position::End, "end.").unwrap();
        let b = g.add_preceding_fragment(&e.id, "In the").unwrap();
        assert_eq!(b.position, Position::Beginning);
        assert!(g.completed());
    }

    #[test]
    fn preceding_rejects_linked_or_beginning_target() {
        let mut g = game(&[0.9]);
        let b = g.add_fragment(Position::Beginning, "start").unwrap();
        assert!(matches!(
            g.add_preceding_fragment(&b.id, "x"),
            Err(CorpseError::SentenceStart(_))
        ));
        let m = g.add_fragment(Position::Middle, "mid").unwrap();
        g.add_preceding_fragment(&m.id, "x").unwrap();
        assert!(matches!(
            g.add_preceding_fragment(&m.id, "y"),
            Err(CorpseError::AlreadyHasPredecessor(_))
        ));
    }

    // -- challenges --

    #[test]
    fn no_fragments_no_challenge() {
        let mut g = game(&[0.5]);
        assert_eq!(g.get_next_challenge().unwrap(), None);
    }

    #[test]
    fn challenge_direction_follows_open_side() {
        let mut g = game(&[0.5]);
        let b = g.add_fragment(Position::Beginning, "foo").unwrap();
        let c = g.get_next_challenge().unwrap().unwrap();
        assert_eq!(c.id, b.id);
        assert_eq!(c.direction, Direction::Following);
        assert_eq!(c.content_part, "foo");
    }

    #[test]
    fn opposite_direction_is_rejected() {
        let mut g = game(&[0.0]);
        let m = g.add_fragment(Position::Middle, "mid").unwrap();
        // selection draw 0.0, tie-break draw 0.0 -> preceding
        let c = g.get_next_challenge().unwrap().unwrap();
        assert_eq!(c.direction, Direction::Preceding);
        let err = g.add_following_fragment(&m.id, "after").unwrap_err();
        assert!(matches!(
            err,
            CorpseError::DirectionMismatch {
                expected: Direction::Preceding,
                actual: Direction::Following,
                ..
            }
        ));
        assert_eq!(g.fragment_count(), 1);
        g.add_preceding_fragment(&m.id, "before").unwrap();
    }

    #[test]
    fn challenge_is_single_use() {
        let mut g = game(&[0.0, 0.0, 0.9]);
        let m = g.add_fragment(Position::Middle, "mid").unwrap();
        g.get_next_challenge().unwrap().unwrap();
        g.add_preceding_fragment(&m.id, "before").unwrap();
        // the challenge was consumed, so the other side is now unconstrained
        g.add_following_fragment(&m.id, "after").unwrap();
    }

    #[test]
    fn failed_reply_keeps_the_challenge() {
        let mut g = game(&[0.0]);
        let m = g.add_fragment(Position::Middle, "mid").unwrap();
        g.get_next_challenge().unwrap().unwrap();
        assert!(matches!(
            g.add_preceding_fragment(&m.id, "  "),
            Err(CorpseError::EmptyContent)
        ));
        assert!(matches!(
            g.add_following_fragment(&m.id, "after"),
            Err(CorpseError::DirectionMismatch { .. })
        ));
    }

    #[test]
    fn replies_to_other_fragments_are_unconstrained() {
        let mut g = game(&[0.0, 0.0, 0.9]);
        let a = g.add_fragment(Position::Middle, "a").unwrap();
        let b = g.add_fragment(Position::Middle, "b").unwrap();
        let c = g.get_next_challenge().unwrap().unwrap();
        // b was created last, so a is served
        assert_eq!(c.id, a.id);
        g.add_following_fragment(&b.id, "free").unwrap();
        // still pending for a
        assert!(g.add_following_fragment(&a.id, "x").is_err());
    }

    #[test]
    fn seeding_discards_the_challenge() {
        let mut g = game(&[0.0, 0.0, 0.9]);
        let m = g.add_fragment(Position::Middle, "mid").unwrap();
        g.get_next_challenge().unwrap().unwrap();
        g.add_fragment(Position::Beginning, "other").unwrap();
        g.add_following_fragment(&m.id, "after").unwrap();
    }

    #[test]
    fn last_served_is_skipped_when_possible() {
        let mut g = game(&[0.0, 0.9]);
        let a = g.add_fragment(Position::Beginning, "a").unwrap();
        let b = g.add_fragment(Position::Beginning, "b").unwrap();
        // b created last -> a served
        assert_eq!(g.get_next_challenge().unwrap().unwrap().id, a.id);
        // a served last leaves only b, so the created-last exclusion falls back
        assert_eq!(g.get_next_challenge().unwrap().unwrap().id, b.id);
        assert_eq!(g.get_next_challenge().unwrap().unwrap().id, a.id);
    }

    #[test]
    fn lone_candidate_is_offered_again() {
        let mut g = game(&[0.5]);
        let a = g.add_fragment(Position::Beginning, "only").unwrap();
        assert_eq!(g.get_next_challenge().unwrap().unwrap().id, a.id);
        assert_eq!(g.get_next_challenge().unwrap().unwrap().id, a.id);
    }

    #[test]
    fn complete_sentences_are_never_offered() {
        let mut g = game(&[0.9]);
        let a = g.add_fragment(Position::Beginning, "done").unwrap();
        g.add_following_fragment(&a.id, "here.").unwrap();
        let open = g.add_fragment(Position::Middle, "open").unwrap();
        for _ in 0..5 {
            assert_eq!(g.get_next_challenge().unwrap().unwrap().id, open.id);
        }
    }

    #[test]
    fn preview_respects_limits() {
        let config = GameConfig::default().with_max_tokens(2).with_max_chars(100);
        let mut g = game_with(config, &[0.5]);
        g.add_fragment(Position::Beginning, "one two three four").unwrap();
        let c = g.get_next_challenge().unwrap().unwrap();
        assert_eq!(c.content_part, "threefour");
    }

    #[test]
    fn pick_index_stays_in_range() {
        assert_eq!(pick_index(0.0, 3), 0);
        assert_eq!(pick_index(0.34, 3), 1);
        assert_eq!(pick_index(0.999, 3), 2);
        assert_eq!(pick_index(1.0, 3), 2);
        assert_eq!(pick_index(-0.5, 3), 0);
        assert_eq!(pick_index(f64::NAN, 3), 0);
    }

    // -- progress and completion --

    #[test]
    fn progress_counts_arms() {
        let mut g = game(&[0.9]);
        let m = g.add_fragment(Position::Middle, "mid").unwrap();
        assert_eq!(g.get_progress(), Progress { open_arms: 2, total_arms: 2 });

        g.add_preceding_fragment(&m.id, "pre").unwrap();
        g.add_following_fragment(&m.id, "post").unwrap();
        let p = g.get_progress();
        // the two new middles each add two arms, one of them linked
        assert_eq!(p.total_arms, 6);
        assert_eq!(p.open_arms, 2);
        assert_eq!(p.connected_arms(), 4);
    }

    #[test]
    fn completed_sentences_gated() {
        let mut g = game(&[0.9]);
        let a = g.add_fragment(Position::Beginning, "foo").unwrap();
        assert!(matches!(g.get_completed_sentences(), Err(CorpseError::NotComplete)));
        g.add_following_fragment(&a.id, "bar.").unwrap();
        let sentences = g.get_completed_sentences().unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "foobar.");
        assert_eq!(sentences[0].fragments.len(), 2);
    }

    #[test]
    fn empty_game_is_not_complete() {
        let g = game(&[0.5]);
        assert!(!g.completed());
        assert!(g.get_completed_sentences().is_err());
    }
}
