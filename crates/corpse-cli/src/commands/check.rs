use std::path::Path;

use colored::Colorize;

use crate::error::CliResult;
use crate::save;

pub fn run(file: &Path) -> CliResult<()> {
    let game = save::load(file)?;
    let progress = game.get_progress();

    println!("  Saved game '{}' is valid.", file.display());
    println!(
        "  {} fragments, {} sentences, {}/{} arms connected",
        game.fragment_count(),
        game.sentence_count(),
        progress.connected_arms(),
        progress.total_arms,
    );
    if game.completed() {
        println!("  {}", "Complete.".green());
    } else {
        println!("  In progress.");
    }

    Ok(())
}
