/*!
 * Text preparation before and cleanup after translation.
 *
 * Preprocessing strips characters the translation models handle poorly.
 * Post-processing applies script-specific fixes to model output: Arabic
 * script targets get spacing and punctuation repair, English gets sentence
 * punctuation and capitalization, Chinese and Hindi only get whitespace
 * normalization.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language_utils::{Language, Script};
use crate::text::normalizer::{remove_stray_arabic_spaces, strip_bidi_controls};

/// Any whitespace run
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Horizontal whitespace run
static HORIZONTAL_WS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Characters the models are not fed: everything but word characters,
/// whitespace and basic punctuation, including its Arabic, CJK and Devanagari forms
static DISALLOWED_CHARS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?\-،؛؟۔。，！？।]").unwrap());

/// Whitespace before Latin sentence punctuation
static SPACE_BEFORE_PUNCT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+([,.!?])").unwrap());

/// Sentence punctuation glued to the next word
static MISSING_SPACE_AFTER_PUNCT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"([,.!?])([A-Za-z])").unwrap());

/// Arabic letter directly followed by a Latin letter or digit
static ARABIC_THEN_LATIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\x{0621}-\x{064A}\x{066E}-\x{06D3}])([A-Za-z0-9])").unwrap()
});

/// Latin letter or digit directly followed by an Arabic letter
static LATIN_THEN_ARABIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z0-9])([\x{0621}-\x{064A}\x{066E}-\x{06D3}])").unwrap()
});

/// Punctuation collapsed when repeated in Arabic-script output
const ARABIC_SCRIPT_PUNCT: [char; 8] = ['.', ',', '!', '?', '،', '؛', '؟', '۔'];

/// A mark followed by its redundant twin; the twin is dropped
const REDUNDANT_PUNCT_PAIRS: [(char, char); 3] = [('؟', '?'), ('،', ','), ('.', ',')];

/// Pre- and post-processing for translated text
pub struct TranslationFormatter;

impl TranslationFormatter {
    /// Prepare text for the model
    ///
    /// Characters outside letters, digits, whitespace and `.,!?-` are
    /// dropped and whitespace collapses to single spaces. May return an
    /// empty string.
    pub fn preprocess(text: &str) -> String {
        let kept = DISALLOWED_CHARS_REGEX.replace_all(text, "");
        WHITESPACE_REGEX.replace_all(&kept, " ").trim().to_string()
    }

    /// Apply target-specific cleanup to model output
    pub fn post_process(text: &str, target: Language) -> String {
        match target.script() {
            Script::Arabic => Self::post_process_arabic_script(text),
            Script::Latin => Self::post_process_latin(text),
            Script::Han | Script::Devanagari => Self::normalize_whitespace(text),
        }
    }

    /// Collapse horizontal whitespace and trim
    pub fn normalize_whitespace(text: &str) -> String {
        HORIZONTAL_WS_REGEX.replace_all(text, " ").trim().to_string()
    }

    fn post_process_arabic_script(text: &str) -> String {
        let stripped = strip_bidi_controls(text);
        let normalized = Self::normalize_whitespace(&stripped);
        let joined = remove_stray_arabic_spaces(&normalized);
        let deduplicated = collapse_repeated_punctuation(&joined);

        let spaced = ARABIC_THEN_LATIN_REGEX.replace_all(&deduplicated, "$1 $2");
        let spaced = LATIN_THEN_ARABIC_REGEX.replace_all(&spaced, "$1 $2");
        spaced.into_owned()
    }

    fn post_process_latin(text: &str) -> String {
        let normalized = Self::normalize_whitespace(text);
        let tightened = SPACE_BEFORE_PUNCT_REGEX.replace_all(&normalized, "$1");
        let spaced = MISSING_SPACE_AFTER_PUNCT_REGEX.replace_all(&tightened, "$1 $2");
        capitalize_sentences(&spaced)
    }
}

/// Replace runs of the same punctuation mark with a single mark, and drop
/// the Latin twin that follows an Arabic mark
fn collapse_repeated_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous: Option<char> = None;

    for c in text.chars() {
        if let Some(p) = previous {
            if ARABIC_SCRIPT_PUNCT.contains(&c) && p == c {
                continue;
            }
            if REDUNDANT_PUNCT_PAIRS.contains(&(p, c)) {
                continue;
            }
        }
        out.push(c);
        previous = Some(c);
    }

    out
}

/// Uppercase the first letter of the text and of every sentence
///
/// Only the first letter changes; the rest of the sentence keeps its case.
fn capitalize_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_sentence_start = true;

    for c in text.chars() {
        if at_sentence_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            at_sentence_start = false;
            continue;
        }

        if matches!(c, '.' | '!' | '?') {
            at_sentence_start = true;
        } else if !c.is_whitespace() && !matches!(c, '"' | '\'' | '(') {
            at_sentence_start = false;
        }
        out.push(c);
    }

    out
}
