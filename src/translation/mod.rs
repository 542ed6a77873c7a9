/*!
 * Translation between the five supported document languages.
 *
 * It is split into several submodules:
 *
 * - `core`: The `Translator` and its chunked translation algorithm
 * - `cache`: Per-translator cache of loaded models keyed by language pair
 * - `formatting`: Preprocessing and target-specific post-processing
 * - `detection`: Statistical language detection
 */

// Re-export main types for easier usage
pub use self::cache::ModelCache;
pub use self::core::{TokenUsageStats, Translation, Translator};
pub use self::detection::detect_language;
pub use self::formatting::TranslationFormatter;

// Submodules
pub mod cache;
pub mod core;
pub mod detection;
pub mod formatting;
