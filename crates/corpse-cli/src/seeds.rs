//! Seed sets: the fragments a new game starts from.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use corpse_core::{CorpseGame, CorpseResult, Position};

use crate::error::{CliError, CliResult};

/// Starting fragments grouped by position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedSet {
    #[serde(default)]
    pub beginning: Vec<String>,
    #[serde(default)]
    pub middle: Vec<String>,
    #[serde(default)]
    pub end: Vec<String>,
}

impl SeedSet {
    /// A built-in seed set by name.
    pub fn preset(name: &str) -> CliResult<Self> {
        let (beginning, middle, end): (&[&str], &[&str], &[&str]) = match name {
            "en" => (
                &[
                    "Setting all that aside,",
                    "Judging by the state of things,",
                    "They say proof beats theory, but",
                ],
                &[
                    "though I pretended not to care,",
                    "debt really is a frightening thing, and",
                    "what we ought to consider is",
                ],
                &[
                    "none of that matters anyway.",
                    "I decided to review my life insurance.",
                    "he just smiled as if about to cry.",
                ],
            ),
            "ja" => (
                &["そんなことよりもまずは", "昨今の情勢を鑑みるに、", "論より証拠と言うけれども、"],
                &[
                    "なんて余裕ぶってみたものの、",
                    "やっぱり借金って怖いもので、",
                    "考慮しなければならないのは、",
                ],
                &[
                    "けれど、そんなことはどうでもいい。",
                    "生命保険を見直すことにした。",
                    "彼はただ泣きそうな顔で笑った。",
                ],
            ),
            other => {
                return Err(CliError::Usage(format!(
                    "unknown preset '{other}' (expected 'en' or 'ja')"
                )));
            }
        };
        Ok(Self {
            beginning: owned(beginning),
            middle: owned(middle),
            end: owned(end),
        })
    }

    /// Read a seed set from a JSON file.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let seeds: Self = serde_json::from_str(&text).map_err(|source| CliError::Json {
            path: path.display().to_string(),
            source,
        })?;
        if seeds.is_empty() {
            return Err(CliError::Usage(format!(
                "{}: no seed fragments",
                path.display()
            )));
        }
        Ok(seeds)
    }

    /// Whether there is nothing to plant.
    pub fn is_empty(&self) -> bool {
        self.beginning
            .iter()
            .chain(&self.middle)
            .chain(&self.end)
            .all(|line| line.trim().is_empty())
    }

    /// Seed every non-blank line into `game`. Returns how many were planted.
    pub fn plant(&self, game: &mut CorpseGame) -> CorpseResult<usize> {
        let groups = [
            (Position::Beginning, &self.beginning),
            (Position::Middle, &self.middle),
            (Position::End, &self.end),
        ];
        let mut planted = 0;
        for (position, lines) in groups {
            for line in lines.iter().filter(|l| !l.trim().is_empty()) {
                game.add_fragment(position, line)?;
                planted += 1;
            }
        }
        Ok(planted)
    }
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
}
