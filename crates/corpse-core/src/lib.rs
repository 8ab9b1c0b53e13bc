//! Game-state engine for single-player exquisite corpse writing.
//!
//! A player grows several sentences at once. Each turn the engine picks an
//! open fragment, shows a short preview of one of its edges, and the player
//! supplies a fragment to attach before or after it. The game ends once
//! every sentence has both a beginning and an end.
//!
//! Randomness and tokenization are injected through [`RandomSource`] and
//! [`Tokenizer`], so a game is fully deterministic under test.

/// Pluggable random source and tokenizer.
pub mod collab;
/// Engine options and their defaults.
pub mod config;
/// Error types used throughout the crate.
pub mod error;
/// Fragments, tokens, and the fragment store.
pub mod fragment;
/// The game engine: seeding, extension, challenges, and progress.
pub mod game;
/// Sets of fragments awaiting a neighbor.
pub mod openness;
/// Partial views of fragment content shown with a challenge.
pub mod preview;
/// Sentence chains and their registry.
pub mod sentence;
/// Serialized state and its validating restore.
pub mod state;

pub use collab::{RandomSource, SeededRandom, SequenceRandom, Tokenizer, WordTokenizer};
pub use config::GameConfig;
pub use error::{CorpseError, CorpseResult};
pub use fragment::{Fragment, FragmentId, Position, Token};
pub use game::{Challenge, CorpseGame, Progress};
pub use preview::Direction;
pub use sentence::{CompletedSentence, SentenceId};
pub use state::{SerializedSentence, SerializedState};
