/*!
 * Arabic shaping and bidirectional reordering for display.
 *
 * Text extracted from a PDF is in logical order with base letters. Rendering
 * it on a surface without a shaping engine needs two steps:
 *
 * 1. Contextual shaping: each letter is replaced by its isolated, initial,
 *    medial or final presentation form (U+FB50-U+FEFF) depending on whether
 *    it joins its neighbours. Lam followed by alef becomes one ligature.
 *    Diacritics are transparent and never break a join.
 * 2. Reordering: the Unicode bidirectional algorithm turns each line into
 *    visual (left-to-right memory) order.
 */

use log::warn;
use std::panic;
use unicode_bidi::BidiInfo;

use crate::text::normalizer::contains_arabic;

/// How a character joins its neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joining {
    /// Joins on both sides (beh, seen, lam, ...)
    Dual,
    /// Joins only to the preceding letter (alef, dal, reh, waw, ...)
    Right,
    /// Joins both sides without changing shape (tatweel, ZWJ)
    Causing,
    /// Skipped when looking for neighbours (harakat)
    Transparent,
    /// Never joins
    NonJoining,
}

/// Presentation forms of one letter: isolated, final, initial, medial
struct Forms {
    isolated: char,
    fin: char,
    initial: Option<char>,
    medial: Option<char>,
}

const fn dual(isolated: char, fin: char, initial: char, medial: char) -> Forms {
    Forms { isolated, fin, initial: Some(initial), medial: Some(medial) }
}

const fn right(isolated: char, fin: char) -> Forms {
    Forms { isolated, fin, initial: None, medial: None }
}

fn forms(c: char) -> Option<Forms> {
    let f = match c {
        '\u{0621}' => right('\u{FE80}', '\u{FE80}'),
        '\u{0622}' => right('\u{FE81}', '\u{FE82}'),
        '\u{0623}' => right('\u{FE83}', '\u{FE84}'),
        '\u{0624}' => right('\u{FE85}', '\u{FE86}'),
        '\u{0625}' => right('\u{FE87}', '\u{FE88}'),
        '\u{0626}' => dual('\u{FE89}', '\u{FE8A}', '\u{FE8B}', '\u{FE8C}'),
        '\u{0627}' => right('\u{FE8D}', '\u{FE8E}'),
        '\u{0628}' => dual('\u{FE8F}', '\u{FE90}', '\u{FE91}', '\u{FE92}'),
        '\u{0629}' => right('\u{FE93}', '\u{FE94}'),
        '\u{062A}' => dual('\u{FE95}', '\u{FE96}', '\u{FE97}', '\u{FE98}'),
        '\u{062B}' => dual('\u{FE99}', '\u{FE9A}', '\u{FE9B}', '\u{FE9C}'),
        '\u{062C}' => dual('\u{FE9D}', '\u{FE9E}', '\u{FE9F}', '\u{FEA0}'),
        '\u{062D}' => dual('\u{FEA1}', '\u{FEA2}', '\u{FEA3}', '\u{FEA4}'),
        '\u{062E}' => dual('\u{FEA5}', '\u{FEA6}', '\u{FEA7}', '\u{FEA8}'),
        '\u{062F}' => right('\u{FEA9}', '\u{FEAA}'),
        '\u{0630}' => right('\u{FEAB}', '\u{FEAC}'),
        '\u{0631}' => right('\u{FEAD}', '\u{FEAE}'),
        '\u{0632}' => right('\u{FEAF}', '\u{FEB0}'),
        '\u{0633}' => dual('\u{FEB1}', '\u{FEB2}', '\u{FEB3}', '\u{FEB4}'),
        '\u{0634}' => dual('\u{FEB5}', '\u{FEB6}', '\u{FEB7}', '\u{FEB8}'),
        '\u{0635}' => dual('\u{FEB9}', '\u{FEBA}', '\u{FEBB}', '\u{FEBC}'),
        '\u{0636}' => dual('\u{FEBD}', '\u{FEBE}', '\u{FEBF}', '\u{FEC0}'),
        '\u{0637}' => dual('\u{FEC1}', '\u{FEC2}', '\u{FEC3}', '\u{FEC4}'),
        '\u{0638}' => dual('\u{FEC5}', '\u{FEC6}', '\u{FEC7}', '\u{FEC8}'),
        '\u{0639}' => dual('\u{FEC9}', '\u{FECA}', '\u{FECB}', '\u{FECC}'),
        '\u{063A}' => dual('\u{FECD}', '\u{FECE}', '\u{FECF}', '\u{FED0}'),
        '\u{0641}' => dual('\u{FED1}', '\u{FED2}', '\u{FED3}', '\u{FED4}'),
        '\u{0642}' => dual('\u{FED5}', '\u{FED6}', '\u{FED7}', '\u{FED8}'),
        '\u{0643}' => dual('\u{FED9}', '\u{FEDA}', '\u{FEDB}', '\u{FEDC}'),
        '\u{0644}' => dual('\u{FEDD}', '\u{FEDE}', '\u{FEDF}', '\u{FEE0}'),
        '\u{0645}' => dual('\u{FEE1}', '\u{FEE2}', '\u{FEE3}', '\u{FEE4}'),
        '\u{0646}' => dual('\u{FEE5}', '\u{FEE6}', '\u{FEE7}', '\u{FEE8}'),
        '\u{0647}' => dual('\u{FEE9}', '\u{FEEA}', '\u{FEEB}', '\u{FEEC}'),
        '\u{0648}' => right('\u{FEED}', '\u{FEEE}'),
        '\u{0649}' => right('\u{FEEF}', '\u{FEF0}'),
        '\u{064A}' => dual('\u{FEF1}', '\u{FEF2}', '\u{FEF3}', '\u{FEF4}'),
        // Persian and Urdu letters
        '\u{0679}' => dual('\u{FB66}', '\u{FB67}', '\u{FB68}', '\u{FB69}'),
        '\u{067E}' => dual('\u{FB56}', '\u{FB57}', '\u{FB58}', '\u{FB59}'),
        '\u{0686}' => dual('\u{FB7A}', '\u{FB7B}', '\u{FB7C}', '\u{FB7D}'),
        '\u{0688}' => right('\u{FB88}', '\u{FB89}'),
        '\u{0691}' => right('\u{FB8C}', '\u{FB8D}'),
        '\u{0698}' => right('\u{FB8A}', '\u{FB8B}'),
        '\u{06A9}' => dual('\u{FB8E}', '\u{FB8F}', '\u{FB90}', '\u{FB91}'),
        '\u{06AF}' => dual('\u{FB92}', '\u{FB93}', '\u{FB94}', '\u{FB95}'),
        '\u{06BE}' => dual('\u{FBAA}', '\u{FBAB}', '\u{FBAC}', '\u{FBAD}'),
        '\u{06C1}' => dual('\u{FBA6}', '\u{FBA7}', '\u{FBA8}', '\u{FBA9}'),
        '\u{06CC}' => dual('\u{FBFC}', '\u{FBFD}', '\u{FBFE}', '\u{FBFF}'),
        '\u{06D2}' => right('\u{FBAE}', '\u{FBAF}'),
        _ => return None,
    };
    Some(f)
}

fn joining(c: char) -> Joining {
    match c {
        '\u{0640}' | '\u{200D}' => Joining::Causing,
        '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06DC}'
        | '\u{06DF}'..='\u{06E4}'
        | '\u{06E7}'
        | '\u{06E8}'
        | '\u{06EA}'..='\u{06ED}' => Joining::Transparent,
        // Hamza has a single form and breaks the join
        '\u{0621}' => Joining::NonJoining,
        _ => match forms(c) {
            Some(f) if f.initial.is_some() => Joining::Dual,
            Some(_) => Joining::Right,
            None => Joining::NonJoining,
        },
    }
}

/// Lam-alef ligature (isolated, final) for an alef variant following lam
fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

const LAM: char = '\u{0644}';

/// Nearest non-transparent neighbour's joining type in a direction
fn neighbour(chars: &[char], index: usize, forward: bool) -> Joining {
    let mut i = index;
    loop {
        if forward {
            i += 1;
            if i >= chars.len() {
                return Joining::NonJoining;
            }
        } else {
            if i == 0 {
                return Joining::NonJoining;
            }
            i -= 1;
        }
        let j = joining(chars[i]);
        if j != Joining::Transparent {
            return j;
        }
    }
}

/// Replace Arabic letters with their contextual presentation forms
pub fn shape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let kind = joining(c);

        let joins_prev = matches!(kind, Joining::Dual | Joining::Right)
            && matches!(neighbour(&chars, i, false), Joining::Dual | Joining::Causing);

        if c == LAM {
            // Harakat between lam and alef do not break the ligature
            let mut j = i + 1;
            while j < chars.len() && joining(chars[j]) == Joining::Transparent {
                j += 1;
            }
            if let Some((isolated, fin)) = chars.get(j).and_then(|a| lam_alef(*a)) {
                out.push(if joins_prev { fin } else { isolated });
                out.extend(&chars[i + 1..j]);
                i = j + 1;
                continue;
            }
        }

        match forms(c) {
            Some(f) => {
                let joins_next = kind == Joining::Dual
                    && matches!(neighbour(&chars, i, true), Joining::Dual | Joining::Right | Joining::Causing);

                let shaped = match (joins_prev, joins_next) {
                    (true, true) => f.medial.unwrap_or(f.fin),
                    (false, true) => f.initial.unwrap_or(f.isolated),
                    (true, false) => f.fin,
                    (false, false) => f.isolated,
                };
                out.push(shaped);
            }
            None => out.push(c),
        }
        i += 1;
    }

    out
}

/// Reorder each line into visual order with the Unicode bidi algorithm
pub fn reorder_visual(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let info = BidiInfo::new(line, None);
            if !info.has_rtl() {
                return line.to_string();
            }
            info.paragraphs
                .iter()
                .map(|para| info.reorder_line(para, para.range.clone()).into_owned())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shape Arabic script and reorder it for display
///
/// Never fails: if shaping or reordering panics the input is returned
/// unchanged and a warning is logged.
pub fn reshape_arabic(text: &str) -> String {
    if !contains_arabic(text) {
        return text.to_string();
    }

    match panic::catch_unwind(|| reorder_visual(&shape(text))) {
        Ok(reshaped) => reshaped,
        Err(_) => {
            warn!("Arabic reshaping failed, returning text unchanged");
            text.to_string()
        }
    }
}
