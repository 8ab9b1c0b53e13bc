//! Configuration for an exquisite corpse game.

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_TOKENS: usize = 3;
const DEFAULT_MAX_CHARS: usize = 10;
const DEFAULT_BEGINNING_PROBABILITY: f64 = 0.3;
const DEFAULT_ENDING_PROBABILITY: f64 = 0.3;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_SENTENCE_ENDING_PUNCTUATIONS: &[&str] = &["。", "！", "？", ".", "!", "?"];

/// Engine options.
///
/// Built from [`Default`] and the `with_*` methods, each of which falls
/// back to the default when given an out-of-range value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    /// Maximum number of tokens shown in a challenge preview.
    pub max_tokens: usize,
    /// Maximum number of characters shown in a challenge preview.
    pub max_chars: usize,
    /// Chance that a prepended fragment begins its sentence.
    pub beginning_probability: f64,
    /// Chance that an appended fragment ends its sentence.
    pub ending_probability: f64,
    /// Trailing marks that force an appended fragment to end its sentence.
    pub sentence_ending_punctuations: Vec<String>,
    /// Seed for the built-in random source.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_chars: DEFAULT_MAX_CHARS,
            beginning_probability: DEFAULT_BEGINNING_PROBABILITY,
            ending_probability: DEFAULT_ENDING_PROBABILITY,
            sentence_ending_punctuations: DEFAULT_SENTENCE_ENDING_PUNCTUATIONS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            seed: DEFAULT_SEED,
        }
    }
}

impl GameConfig {
    /// Set the preview token limit. Zero falls back to the default.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = normalise_positive(max_tokens, DEFAULT_MAX_TOKENS);
        self
    }

    /// Set the preview character limit. Zero falls back to the default.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = normalise_positive(max_chars, DEFAULT_MAX_CHARS);
        self
    }

    /// Set the beginning probability. Values outside `[0, 1]` fall back to the default.
    pub fn with_beginning_probability(mut self, probability: f64) -> Self {
        self.beginning_probability =
            normalise_probability(probability, DEFAULT_BEGINNING_PROBABILITY);
        self
    }

    /// Set the ending probability. Values outside `[0, 1]` fall back to the default.
    pub fn with_ending_probability(mut self, probability: f64) -> Self {
        self.ending_probability = normalise_probability(probability, DEFAULT_ENDING_PROBABILITY);
        self
    }

    /// Replace the sentence-ending punctuation list. Blank entries are dropped.
    pub fn with_sentence_ending_punctuations<I, S>(mut self, punctuations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentence_ending_punctuations = punctuations
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.trim().is_empty())
            .collect();
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Re-apply normalisation to every field.
    ///
    /// Used on configs that did not come through the builder, such as
    /// ones read from disk.
    pub fn normalised(self) -> Self {
        let punctuations = self.sentence_ending_punctuations;
        Self {
            seed: self.seed,
            ..Self::default()
        }
        .with_max_tokens(self.max_tokens)
        .with_max_chars(self.max_chars)
        .with_beginning_probability(self.beginning_probability)
        .with_ending_probability(self.ending_probability)
        .with_sentence_ending_punctuations(punctuations)
    }

    /// Whether `content` ends with one of the configured punctuation marks.
    pub fn ends_sentence(&self, content: &str) -> bool {
        let trimmed = content.trim();
        self.sentence_ending_punctuations
            .iter()
            .any(|p| trimmed.ends_with(p.as_str()))
    }
}

fn normalise_positive(value: usize, fallback: usize) -> usize {
    if value > 0 { value } else { fallback }
}

fn normalise_probability(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        value
    } else {
        fallback
    }
}
