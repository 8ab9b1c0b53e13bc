//! Error types for the exquisite corpse engine.

use thiserror::Error;

use crate::fragment::FragmentId;
use crate::preview::Direction;
use crate::sentence::SentenceId;

/// Result type for engine operations.
pub type CorpseResult<T> = Result<T, CorpseError>;

/// Errors that can occur while playing or restoring a game.
#[derive(Debug, Error)]
pub enum CorpseError {
    // -----------------------------------------------------------------------
    // Content and tokenizer
    // -----------------------------------------------------------------------
    /// Fragment content was empty after trimming.
    #[error("fragment content must not be empty")]
    EmptyContent,

    /// The tokenizer reported that it could not honor its contract.
    #[error("tokenizer contract violated: {0}")]
    TokenizerContract(String),

    /// The tokenizer produced no tokens.
    #[error("token sequence must not be empty")]
    EmptyTokens,

    /// A token surface was blank after trimming.
    #[error("token {index} has a blank surface")]
    BlankToken {
        /// Position of the offending token in the sequence.
        index: usize,
    },

    // -----------------------------------------------------------------------
    // Lookups and link state
    // -----------------------------------------------------------------------
    /// No fragment with this ID exists.
    #[error("fragment not found: {0}")]
    FragmentNotFound(FragmentId),

    /// No sentence with this ID exists.
    #[error("sentence not found: {0}")]
    SentenceNotFound(SentenceId),

    /// The target fragment already has a following fragment.
    #[error("fragment {0} already has a successor")]
    AlreadyHasSuccessor(FragmentId),

    /// The target fragment already has a preceding fragment.
    #[error("fragment {0} already has a predecessor")]
    AlreadyHasPredecessor(FragmentId),

    /// Cannot append after a fragment that ends its sentence.
    #[error("cannot extend terminal fragment {0}")]
    TerminalFragment(FragmentId),

    /// Cannot prepend before a fragment that begins its sentence.
    #[error("cannot prepend to sentence start {0}")]
    SentenceStart(FragmentId),

    // -----------------------------------------------------------------------
    // Challenge protocol
    // -----------------------------------------------------------------------
    /// A reply extended the served fragment in the wrong direction.
    #[error("fragment {fragment} was served for {expected} extension, not {actual}")]
    DirectionMismatch {
        /// The fragment that was served.
        fragment: FragmentId,
        /// The direction the challenge asked for.
        expected: Direction,
        /// The direction the reply attempted.
        actual: Direction,
    },

    /// Completed sentences were requested before the game was finished.
    #[error("the game is not complete yet")]
    NotComplete,

    // -----------------------------------------------------------------------
    // Restore
    // -----------------------------------------------------------------------
    /// A fragment appeared in the fragment list more than once.
    #[error("fragment {0} is listed more than once")]
    DuplicateFragment(FragmentId),

    /// A sentence appeared in the sentence list more than once.
    #[error("sentence {0} is listed more than once")]
    DuplicateSentence(SentenceId),

    /// A fragment ID is listed by more than one sentence.
    #[error("fragment {0} belongs to multiple sentences")]
    MultipleOwners(FragmentId),

    /// A fragment is not listed by any sentence.
    #[error("fragment {0} has no owning sentence")]
    NoOwningSentence(FragmentId),

    /// A fragment records a different owner than the sentence listing it.
    #[error("fragment {fragment} is not owned by sentence {sentence}")]
    OwnershipMismatch {
        /// The sentence whose list was walked.
        sentence: SentenceId,
        /// The fragment with conflicting ownership.
        fragment: FragmentId,
    },

    /// A fragment's position contradicts its own links.
    #[error("fragment {0} has a position that contradicts its links")]
    PositionConflict(FragmentId),

    /// A sentence lists no fragments.
    #[error("sentence {0} has no fragments")]
    EmptySentence(SentenceId),

    /// The first listed fragment is not the sentence head.
    #[error("sentence {0} has a bad head id")]
    BadHeadId(SentenceId),

    /// The last listed fragment is not the sentence tail.
    #[error("sentence {0} has a bad tail id")]
    BadTailId(SentenceId),

    /// A sentence lists a fragment that does not exist.
    #[error("sentence {sentence} lists unknown fragment {fragment}")]
    UnknownMember {
        /// The sentence whose list was walked.
        sentence: SentenceId,
        /// The missing fragment.
        fragment: FragmentId,
    },

    /// A fragment's next link disagrees with the sentence order.
    #[error("sentence {sentence} has broken forward link order at fragment {fragment}")]
    BrokenForwardLink {
        /// The sentence whose list was walked.
        sentence: SentenceId,
        /// The fragment whose next link is wrong.
        fragment: FragmentId,
    },

    /// A fragment's previous link disagrees with the sentence order.
    #[error("sentence {sentence} has broken backward link order at fragment {fragment}")]
    BrokenBackwardLink {
        /// The sentence whose list was walked.
        sentence: SentenceId,
        /// The fragment whose successor points back elsewhere.
        fragment: FragmentId,
    },

    /// The head fragment of a sentence has a previous link.
    #[error("sentence {sentence} head fragment {fragment} has a predecessor")]
    HeadHasPredecessor {
        /// The offending sentence.
        sentence: SentenceId,
        /// The head fragment.
        fragment: FragmentId,
    },

    /// The tail fragment of a sentence has a next link.
    #[error("sentence {sentence} tail fragment {fragment} has a successor")]
    TailHasSuccessor {
        /// The offending sentence.
        sentence: SentenceId,
        /// The tail fragment.
        fragment: FragmentId,
    },

    /// A sentence's boundary flags disagree with its head or tail position.
    #[error("sentence {0} has boundary flags that disagree with its fragments")]
    BoundaryFlagMismatch(SentenceId),

    /// A persisted openness set differs from the recomputed one.
    #[error("{side} openness set does not match")]
    OpennessMismatch {
        /// Which side's set was wrong.
        side: Direction,
    },

    /// A persisted openness set contains the same ID twice.
    #[error("{side} openness set does not match (duplicate detected)")]
    OpennessDuplicate {
        /// Which side's set was wrong.
        side: Direction,
    },

    /// The persisted last-served fragment does not exist.
    #[error("unknown last-served id: {0}")]
    UnknownLastServed(FragmentId),

    /// The persisted completion flag disagrees with the restored sentences.
    #[error("completion state does not match (stored {stored}, actual {actual})")]
    CompletionMismatch {
        /// The flag found in the serialized state.
        stored: bool,
        /// The flag recomputed from the sentences.
        actual: bool,
    },

    /// The serialized state could not be read or written as JSON.
    #[error("invalid state json: {0}")]
    Json(#[from] serde_json::Error),
}
