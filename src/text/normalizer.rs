/*!
 * Cleaning of raw extracted text.
 *
 * Text from a PDF text layer or from OCR carries control characters, runs of
 * spaces, stacks of blank lines and, for Arabic, spaces wedged between the
 * letters of a word. `clean` removes all of these and is idempotent.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Horizontal whitespace (everything `\s` matches except line breaks)
static HORIZONTAL_WS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Spaces hugging a line break
static LINE_EDGE_SPACES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r" *\n *").unwrap());

/// Two or more blank lines
static BLANK_LINES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Clean raw extracted text
///
/// In order: line endings are unified, bidi controls and non-printable
/// characters are dropped (keeping `\n` and `\t`), horizontal whitespace
/// collapses to one space, blank-line runs collapse to a single blank line,
/// the result is trimmed and stray spaces inside Arabic words are removed.
pub fn clean(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let printable: String = strip_bidi_controls(&unified)
        .chars()
        .filter(|c| !is_non_printable(*c))
        .collect();

    let collapsed = HORIZONTAL_WS_REGEX.replace_all(&printable, " ");
    let collapsed = LINE_EDGE_SPACES_REGEX.replace_all(&collapsed, "\n");
    let collapsed = BLANK_LINES_REGEX.replace_all(&collapsed, "\n\n");

    remove_stray_arabic_spaces(collapsed.trim())
}

fn is_non_printable(c: char) -> bool {
    match c {
        '\n' | '\t' => false,
        // Byte order mark and soft hyphen leak out of text layers
        '\u{FEFF}' | '\u{00AD}' => true,
        _ => c.is_control(),
    }
}

/// Whether a character is a bidi control (LRM, RLM, embeddings, overrides) or zero-width space
pub fn is_bidi_control(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}')
}

/// Remove U+200B-U+200F and U+202A-U+202E
pub fn strip_bidi_controls(text: &str) -> String {
    text.chars().filter(|c| !is_bidi_control(*c)).collect()
}

/// Arabic base letter, including the Persian/Urdu extensions
///
/// Tatweel and the superscript alef are excluded: they never form a word on
/// their own.
pub fn is_arabic_letter(c: char) -> bool {
    matches!(c, '\u{0621}'..='\u{064A}' | '\u{066E}'..='\u{06D3}' | '\u{06D5}')
        && c != '\u{0640}'
        && c != '\u{0670}'
}

/// Any character from the Arabic blocks
pub fn is_arabic_char(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}' | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
}

/// Whether text contains Arabic script at all
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

/// Remove spaces that split an Arabic word
///
/// A space is stray when it sits between two Arabic letters and one of the
/// two tokens it separates is a single Arabic letter, the usual OCR artifact
/// ("ال ك تاب"). Spaces between full words are kept. Tokens are measured on
/// the output built so far, so merges only ever grow them and a second pass
/// finds nothing to remove.
pub fn remove_stray_arabic_spaces(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().next_back();
            let next = chars.get(i + 1).copied();

            if let (Some(p), Some(n)) = (prev, next) {
                if is_arabic_letter(p) && is_arabic_letter(n) {
                    let prev_token = out.rsplit([' ', '\n']).next().unwrap_or("");
                    let next_token: String = chars[i + 1..]
                        .iter()
                        .take_while(|c| **c != ' ' && **c != '\n')
                        .collect();

                    if arabic_letter_count(prev_token) == 1 || arabic_letter_count(&next_token) == 1 {
                        continue;
                    }
                }
            }
        }
        out.push(c);
    }

    out
}

fn arabic_letter_count(token: &str) -> usize {
    token.chars().filter(|c| is_arabic_letter(*c)).count()
}
