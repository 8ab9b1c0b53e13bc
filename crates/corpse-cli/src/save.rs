//! Save files: the engine state plus the config it was played with.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use corpse_core::{CorpseGame, GameConfig, SeededRandom, SerializedState, WordTokenizer};

use crate::error::{CliError, CliResult};

/// What `corpse play --save` writes.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub config: GameConfig,
    pub state: SerializedState,
}

/// A save file, or a bare engine state exported by another frontend.
#[derive(Deserialize)]
#[serde(untagged)]
enum SaveInput {
    Wrapped(SaveFile),
    Bare(SerializedState),
}

/// Read a save file and restore the game it holds.
pub fn load(path: &Path) -> CliResult<CorpseGame> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let input: SaveInput = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })?;
    let (config, state) = match input {
        SaveInput::Wrapped(save) => (save.config.normalised(), save.state),
        SaveInput::Bare(state) => (GameConfig::default(), state),
    };
    let random = SeededRandom::new(resume_seed(config.seed, &state));
    let mut game = CorpseGame::with_collaborators(config, random, WordTokenizer);
    game.restore(&state)?;
    Ok(game)
}

/// Seed for the random source of a resumed game.
///
/// Offset by the number of fragments so a resume does not replay the
/// draws the game started with.
fn resume_seed(seed: u64, state: &SerializedState) -> u64 {
    seed.wrapping_add(state.fragments.len() as u64)
}

/// Write `game` to `path`.
pub fn write(path: &Path, game: &CorpseGame) -> CliResult<()> {
    let save = SaveFile {
        config: game.config().clone(),
        state: game.serialize(),
    };
    let json = serde_json::to_string_pretty(&save).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "saved game");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpse_core::Position;
    use tempfile::TempDir;

    #[test]
    fn write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.json");

        let mut game = CorpseGame::new(GameConfig::default().with_max_chars(4));
        game.add_fragment(Position::Beginning, "Once").unwrap();
        write(&path, &game).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.serialize(), game.serialize());
        assert_eq!(loaded.config().max_chars, 4);
    }

    #[test]
    fn bare_state_loads_with_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut game = CorpseGame::new(GameConfig::default().with_max_chars(4));
        game.add_fragment(Position::Middle, "drifting").unwrap();
        fs::write(&path, game.to_json().unwrap()).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.fragment_count(), 1);
        assert_eq!(loaded.config().max_chars, 10);
    }

    #[test]
    fn resume_seed_moves_with_progress() {
        let mut game = CorpseGame::new(GameConfig::default());
        assert_eq!(resume_seed(42, &game.serialize()), 42);

        let b = game.add_fragment(Position::Beginning, "Once").unwrap();
        game.add_following_fragment(&b.id, "upon").unwrap();
        assert_eq!(resume_seed(42, &game.serialize()), 44);
        assert_eq!(resume_seed(u64::MAX, &game.serialize()), 1);
    }

    #[test]
    fn loaded_game_keeps_its_seed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.json");

        let mut game = CorpseGame::new(GameConfig::default().with_seed(7));
        game.add_fragment(Position::Middle, "drifting").unwrap();
        write(&path, &game).unwrap();

        assert_eq!(load(&path).unwrap().config().seed, 7);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Path::new("/definitely/not/here.json")).err().unwrap();
        assert!(err.to_string().contains("here.json"));
    }
}
