//! Errors surfaced by the command-line driver.

use thiserror::Error;

use corpse_core::CorpseError;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Anything that can stop a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("{path}: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// The underlying failure.
        source: std::io::Error,
    },

    /// Terminal input or output failed.
    #[error("terminal: {0}")]
    Terminal(#[from] std::io::Error),

    /// A file was not valid JSON of the expected shape.
    #[error("{path}: {source}")]
    Json {
        /// The file involved.
        path: String,
        /// The underlying failure.
        source: serde_json::Error,
    },

    /// The engine refused an operation.
    #[error("{0}")]
    Game(#[from] CorpseError),

    /// The command was used incorrectly.
    #[error("{0}")]
    Usage(String),
}
