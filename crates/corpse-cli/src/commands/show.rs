use std::path::Path;

use crate::error::CliResult;
use crate::save;

pub fn run(file: &Path, joiner: &str) -> CliResult<()> {
    let game = save::load(file)?;
    let sentences = game.get_completed_sentences()?;
    super::print_sentences(&sentences, joiner);
    Ok(())
}
