use lingua::{LanguageDetector, LanguageDetectorBuilder};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::language_utils::Language;

/// Anything that is not a word character or whitespace
static NON_WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Detector restricted to the supported languages; building it loads the
/// language models, so it is built once
static DETECTOR: Lazy<LanguageDetector> = Lazy::new(|| {
    LanguageDetectorBuilder::from_languages(&[
        lingua::Language::Arabic,
        lingua::Language::English,
        lingua::Language::Chinese,
        lingua::Language::Hindi,
        lingua::Language::Urdu,
    ])
    .build()
});

fn from_lingua(language: lingua::Language) -> Option<Language> {
    match language {
        lingua::Language::Arabic => Some(Language::Arabic),
        lingua::Language::English => Some(Language::English),
        lingua::Language::Chinese => Some(Language::Chinese),
        lingua::Language::Hindi => Some(Language::Hindi),
        lingua::Language::Urdu => Some(Language::Urdu),
        _ => None,
    }
}

/// Detect the language of a text, defaulting to English
///
/// Punctuation and symbols are stripped first. Text with no recognizable
/// content, or text in an unsupported language, yields English.
pub fn detect_language(text: &str) -> Language {
    let stripped = NON_WORD_REGEX.replace_all(text, " ");
    if stripped.trim().is_empty() {
        return Language::English;
    }

    match DETECTOR.detect_language_of(stripped.as_ref()).and_then(from_lingua) {
        Some(language) => language,
        None => {
            debug!("Language detection inconclusive, defaulting to English");
            Language::English
        }
    }
}
