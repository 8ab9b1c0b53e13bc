pub mod check;
pub mod play;
pub mod show;

use corpse_core::CompletedSentence;

/// Join a sentence's fragments for display.
///
/// With an empty joiner this is exactly the engine's sentence text.
fn render_sentence(sentence: &CompletedSentence, joiner: &str) -> String {
    if joiner.is_empty() {
        return sentence.text.clone();
    }
    sentence
        .fragments
        .iter()
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join(joiner)
}

/// Print every finished sentence, numbered.
fn print_sentences(sentences: &[CompletedSentence], joiner: &str) {
    for (i, sentence) in sentences.iter().enumerate() {
        println!("  {}. {}", i + 1, render_sentence(sentence, joiner));
    }
}
