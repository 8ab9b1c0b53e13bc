//! Injected collaborators: the random source and the tokenizer.
//!
//! The engine never reaches for global state. Both collaborators are
//! handed in at construction so a game can be replayed exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fragment::Token;

/// A source of uniformly distributed numbers in `[0, 1)`.
///
/// Called once per boundary decision, once per direction tie-break, and
/// once per candidate selection.
pub trait RandomSource {
    /// Draw the next number in `[0, 1)`.
    fn next_f64(&mut self) -> f64;
}

impl<F: FnMut() -> f64> RandomSource for F {
    fn next_f64(&mut self) -> f64 {
        self()
    }
}

/// Splits fragment content into tokens.
///
/// Returning `Err` signals that the tokenizer could not honor its
/// contract for this input. The engine also rejects empty output and
/// blank surfaces, whichever tokenizer produced them.
pub trait Tokenizer {
    /// Tokenize `content`, which is already trimmed and non-empty.
    fn tokenize(&self, content: &str) -> Result<Vec<Token>, String>;
}

impl<F: Fn(&str) -> Result<Vec<Token>, String>> Tokenizer for F {
    fn tokenize(&self, content: &str) -> Result<Vec<Token>, String> {
        self(content)
    }
}

/// A seeded [`StdRng`] for reproducible play.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a random source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// An empty list always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    /// Create a source that cycles through `values`.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// The default tokenizer.
///
/// Whitespace separates tokens, runs of letters and digits form one token,
/// and every punctuation mark is a token of its own. Japanese and Chinese
/// characters carry no spacing, so each one becomes a single token.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, content: &str) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        let mut word = String::new();

        for ch in content.chars() {
            if is_ideographic(ch) {
                flush(&mut word, &mut tokens);
                tokens.push(Token::new(ch.to_string()));
            } else if ch.is_alphanumeric() {
                word.push(ch);
            } else if is_apostrophe(ch) && !word.is_empty() {
                word.push(ch);
            } else {
                flush(&mut word, &mut tokens);
                if !ch.is_whitespace() {
                    tokens.push(Token::new(ch.to_string()));
                }
            }
        }
        flush(&mut word, &mut tokens);

        Ok(tokens)
    }
}

fn flush(word: &mut String, tokens: &mut Vec<Token>) {
    if !word.is_empty() {
        tokens.push(Token::new(std::mem::take(word)));
    }
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}')
}

fn is_ideographic(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{30FF}'   // hiragana, katakana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility
        | '\u{FF66}'..='\u{FF9F}' // half-width katakana
    )
}
