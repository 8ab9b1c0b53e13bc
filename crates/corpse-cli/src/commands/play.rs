use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;

use corpse_core::{Challenge, CorpseGame, Direction, GameConfig, Position};

use crate::error::CliResult;
use crate::save;
use crate::seeds::SeedSet;

/// How a play session gets its first fragments.
pub enum Start {
    /// A built-in seed set.
    Preset(String),
    /// A JSON seed file.
    SeedFile(PathBuf),
    /// A saved game.
    Resume(PathBuf),
}

pub fn run(start: Start, config: GameConfig, save_path: Option<&Path>, joiner: &str) -> CliResult<()> {
    let mut game = match start {
        Start::Resume(path) => save::load(&path)?,
        Start::SeedFile(path) => seeded(config, &SeedSet::load(&path)?)?,
        Start::Preset(name) => seeded(config, &SeedSet::preset(&name)?)?,
    };

    println!("  {} exquisite corpse", "Starting".bold());
    println!(
        "  {} sentences | Type ':progress', ':save' or ':quit'.\n",
        game.sentence_count()
    );

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();
    let mut current: Option<Challenge> = None;

    loop {
        if current.is_none() {
            current = game.get_next_challenge()?;
        }
        let Some(challenge) = current.clone() else {
            println!("  {}", "All sentences are complete!".green().bold());
            super::print_sentences(&game.get_completed_sentences()?, joiner);
            break;
        };

        print_challenge(&challenge);
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let input = line.trim();
        match input {
            "" => continue,
            ":quit" | ":q" => break,
            ":progress" | ":p" => {
                print_progress(&game);
                continue;
            }
            ":save" => {
                match save_path {
                    Some(path) => {
                        save::write(path, &game)?;
                        println!("  Saved to {}.\n", path.display());
                    }
                    None => println!("{}\n", "no --save path given".yellow()),
                }
                continue;
            }
            _ => {}
        }

        let added = match challenge.direction {
            Direction::Preceding => game.add_preceding_fragment(&challenge.id, input),
            Direction::Following => game.add_following_fragment(&challenge.id, input),
        };
        match added {
            Ok(fragment) => {
                match fragment.position {
                    Position::Beginning => println!("  {}\n", "A sentence begins here.".cyan()),
                    Position::End => println!("  {}\n", "A sentence ends here.".cyan()),
                    Position::Middle => println!(),
                }
                current = None;
            }
            Err(e) => println!("{}\n", e.to_string().yellow()),
        }
    }

    if let Some(path) = save_path {
        save::write(path, &game)?;
    }
    Ok(())
}

fn seeded(config: GameConfig, seeds: &SeedSet) -> CliResult<CorpseGame> {
    let mut game = CorpseGame::new(config);
    seeds.plant(&mut game)?;
    Ok(game)
}

fn print_challenge(challenge: &Challenge) {
    match challenge.direction {
        Direction::Preceding => {
            println!("  Write what comes {}:", "BEFORE".bold());
            println!("    {}…", challenge.content_part.dimmed());
        }
        Direction::Following => {
            println!("  Write what comes {}:", "AFTER".bold());
            println!("    …{}", challenge.content_part.dimmed());
        }
    }
}

fn print_progress(game: &CorpseGame) {
    let progress = game.get_progress();
    println!(
        "  {}/{} arms connected, {} open\n",
        progress.connected_arms(),
        progress.total_arms,
        progress.open_arms,
    );
}
