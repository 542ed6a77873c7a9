/*!
 * Tests for cleaning, Arabic shaping and chunking
 */

use lexdoc::text::arabic::{reorder_visual, shape};
use lexdoc::text::normalizer::{contains_arabic, remove_stray_arabic_spaces};
use lexdoc::text::{clean, clean_for_display, reshape_arabic, split, split_sentences};

fn sample_inputs() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "plain text",
        "  First   line\t\twith  gaps \n\n\n\n Second\r\nline  ",
        "ال ك تاب على الطاولة\u{200F}",
        "مرحبا\u{00AD} بالعالم\n\n\n\nو ع ل ي ك م",
        "Mixed العربية and English\u{202B} text\r\r",
        "\u{FEFF}ب  ب  ب",
    ]
}

#[test]
fn test_clean_shouldBeIdempotent() {
    for input in sample_inputs() {
        let once = clean(input);
        assert_eq!(clean(&once), once, "clean is not idempotent for {:?}", input);
    }
}

#[test]
fn test_clean_shouldNeverLeaveTripleNewlinesOrDoubleSpaces() {
    for input in sample_inputs() {
        let cleaned = clean(input);
        assert!(!cleaned.contains("\n\n\n"));
        assert!(!cleaned.contains("  "));
        assert_eq!(cleaned, cleaned.trim());
    }
}

#[test]
fn test_removeStrayArabicSpaces_shouldKeepSpacesBetweenWords() {
    assert_eq!(remove_stray_arabic_spaces("عقد إيجار سكني"), "عقد إيجار سكني");
    assert_eq!(remove_stray_arabic_spaces("ك تاب"), "كتاب");
}

#[test]
fn test_reshapeArabic_withLatinOnly_shouldBeUnchanged() {
    let text = "Article 5 of Law No. 26";
    assert_eq!(reshape_arabic(text), text);
    assert!(!contains_arabic(text));
}

#[test]
fn test_shape_withLamAlef_shouldUseLigature() {
    assert_eq!(shape("سلام"), "\u{FEB3}\u{FEFC}\u{FEE1}");
    assert_eq!(reshape_arabic("سلام"), "\u{FEE1}\u{FEFC}\u{FEB3}");
}

#[test]
fn test_reorderVisual_shouldKeepLatinRunsReadable() {
    let visual = reorder_visual("abc");
    assert_eq!(visual, "abc");
}

#[test]
fn test_cleanForDisplay_shouldCleanBeforeShaping() {
    let displayed = clean_for_display("  سلام  \u{200F}");
    assert_eq!(displayed, "\u{FEE1}\u{FEFC}\u{FEB3}");
}

fn long_document() -> String {
    let paragraph_a = "The lessee shall pay rent monthly. Payment is due on the first day. Late payment incurs a fee.";
    let paragraph_b = "يلتزم المستأجر بدفع الإيجار. ويحق للمؤجر فسخ العقد؟ نعم في حالات محددة.";
    let long_sentence = "x".repeat(120);
    format!("{}\n\n{}\n\n{}\n\n{}", paragraph_a, paragraph_b, long_sentence, paragraph_a)
}

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn test_split_shouldCoverTextInOrder() {
    let text = long_document();
    for max in [10, 40, 80, 500] {
        let chunks = split(&text, max);
        assert_eq!(without_whitespace(&chunks.concat()), without_whitespace(&text), "coverage for max {}", max);
    }
}

#[test]
fn test_split_shouldRespectBoundsExceptOversizedSentences() {
    let text = long_document();
    let max = 60;
    let sentences: Vec<String> = text.split("\n\n").flat_map(split_sentences).collect();

    for chunk in split(&text, max) {
        assert!(!chunk.trim().is_empty());
        let len = chunk.chars().count();
        if len > max {
            assert!(sentences.iter().any(|s| s == &chunk), "oversized chunk is not a single sentence: {:?}", chunk);
        }
    }
}

#[test]
fn test_split_withEmptyText_shouldReturnNoChunks() {
    assert!(split("", 100).is_empty());
    assert!(split("\n\n  \n\n", 100).is_empty());
}
