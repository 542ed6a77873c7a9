/*!
 * Splitting long text into bounded chunks for the models.
 *
 * Chunks follow paragraph boundaries first and sentence boundaries second.
 * Lengths are counted in characters, not bytes, so Arabic and Devanagari
 * text gets the same budget as Latin text.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence-ending punctuation followed by whitespace, including the Arabic
/// question mark, the Urdu full stop and the Devanagari danda. CJK full-width
/// marks end a sentence with or without trailing whitespace.
static SENTENCE_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?؟۔।]\s+|[。！？]\s*").unwrap());

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_SEPARATOR: &str = " ";

/// A piece of text that is never split further
struct Unit<'a> {
    text: &'a str,
    /// First unit of a paragraph, rejoined with a blank line
    starts_paragraph: bool,
}

/// Split text into sentences, keeping the terminating punctuation
pub fn split_sentences(text: &str) -> Vec<String> {
    sentence_slices(text).into_iter().map(str::to_string).collect()
}

/// Split text into ordered chunks of at most `max_chunk_size` characters
///
/// Whole paragraphs are packed while they fit. A paragraph that is itself over
/// budget is broken into sentences, which are packed the same way. A single
/// sentence longer than the budget becomes its own chunk. No chunk is empty.
pub fn split(text: &str, max_chunk_size: usize) -> Vec<String> {
    let mut units = Vec::new();

    for paragraph in text.split(PARAGRAPH_SEPARATOR).map(str::trim).filter(|p| !p.is_empty()) {
        if paragraph.chars().count() <= max_chunk_size {
            units.push(Unit { text: paragraph, starts_paragraph: true });
            continue;
        }

        let mut first = true;
        for sentence in sentence_slices(paragraph) {
            units.push(Unit { text: sentence, starts_paragraph: first });
            first = false;
        }
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for unit in units {
        let unit_len = unit.text.chars().count();

        if current.is_empty() {
            current.push_str(unit.text);
            current_len = unit_len;
            continue;
        }

        let separator = if unit.starts_paragraph { PARAGRAPH_SEPARATOR } else { SENTENCE_SEPARATOR };
        let separator_len = separator.chars().count();

        if current_len + separator_len + unit_len > max_chunk_size {
            chunks.push(std::mem::take(&mut current));
            current.push_str(unit.text);
            current_len = unit_len;
        } else {
            current.push_str(separator);
            current.push_str(unit.text);
            current_len += separator_len + unit_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn sentence_slices(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY_REGEX.find_iter(text) {
        // Keep the punctuation, drop the whitespace
        let punct_len = text[boundary.start()..].chars().next().map_or(0, char::len_utf8);
        let sentence = text[start..boundary.start() + punct_len].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = boundary.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}
