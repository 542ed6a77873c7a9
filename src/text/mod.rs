/*!
 * Text utilities shared by every stage: cleaning, Arabic display shaping and
 * chunking.
 */

pub mod arabic;
pub mod chunker;
pub mod normalizer;

pub use arabic::reshape_arabic;
pub use chunker::{split, split_sentences};
pub use normalizer::clean;

/// Clean text and prepare it for display
pub fn clean_for_display(text: &str) -> String {
    reshape_arabic(&clean(text))
}
