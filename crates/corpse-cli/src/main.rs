//! CLI frontend for the exquisite corpse engine.

mod commands;
mod error;
mod save;
mod seeds;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "corpse",
    about = "Exquisite corpse: grow sentences one hidden fragment at a time",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine state transitions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game, or resume a saved one, and play it in the terminal
    Play {
        /// JSON file with "beginning", "middle" and "end" seed lists
        #[arg(long, conflicts_with_all = ["resume", "preset"])]
        seeds: Option<PathBuf>,

        /// Built-in seed set to start from: en, ja
        #[arg(long, default_value = "en")]
        preset: String,

        /// Saved game to continue, with the settings it was saved with
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Where `:save` and quitting write the game
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// RNG seed for reproducible games
        #[arg(long, conflicts_with = "resume", default_value = "42")]
        seed: u64,

        /// Maximum tokens shown in a preview
        #[arg(long, conflicts_with = "resume", default_value = "3")]
        max_tokens: usize,

        /// Maximum characters shown in a preview
        #[arg(long, conflicts_with = "resume", default_value = "10")]
        max_chars: usize,

        /// Chance that a prepended fragment starts its sentence
        #[arg(long, conflicts_with = "resume", default_value = "0.3")]
        beginning_probability: f64,

        /// Chance that an appended fragment ends its sentence
        #[arg(long, conflicts_with = "resume", default_value = "0.3")]
        ending_probability: f64,

        /// Text placed between fragments when printing finished sentences
        #[arg(long, default_value = "")]
        joiner: String,
    },

    /// Validate a saved game and report its progress
    Check {
        /// Saved game file
        file: PathBuf,
    },

    /// Print the finished sentences of a completed game
    Show {
        /// Saved game file
        file: PathBuf,

        /// Text placed between fragments
        #[arg(long, default_value = "")]
        joiner: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Play {
            seeds,
            preset,
            resume,
            save,
            seed,
            max_tokens,
            max_chars,
            beginning_probability,
            ending_probability,
            joiner,
        } => {
            let config = corpse_core::GameConfig::default()
                .with_seed(seed)
                .with_max_tokens(max_tokens)
                .with_max_chars(max_chars)
                .with_beginning_probability(beginning_probability)
                .with_ending_probability(ending_probability);
            let start = match (resume, seeds) {
                (Some(path), _) => commands::play::Start::Resume(path),
                (None, Some(path)) => commands::play::Start::SeedFile(path),
                (None, None) => commands::play::Start::Preset(preset),
            };
            commands::play::run(start, config, save.as_deref(), &joiner)
        }
        Commands::Check { file } => commands::check::run(&file),
        Commands::Show { file, joiner } => commands::show::run(&file, &joiner),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
