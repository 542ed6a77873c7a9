use anyhow::{Result, anyhow};
use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TranslationError;

/// Language utilities for the five supported document languages
///
/// Names, ISO 639-1 and ISO 639-3 codes and native names all resolve to the
/// same closed `Language` enum at the boundary, so nothing downstream ever
/// dispatches on free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Arabic,
    English,
    Chinese,
    Hindi,
    Urdu,
}

/// Writing system family, used to pick post-processing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Arabic script (Arabic, Urdu)
    Arabic,
    /// Latin script (English)
    Latin,
    /// Han ideographs (Chinese)
    Han,
    /// Devanagari (Hindi)
    Devanagari,
}

/// One row of the language mapping table
struct LanguageEntry {
    language: Language,
    name: &'static str,
    part1: &'static str,
    part3: &'static str,
    native: &'static str,
    script: Script,
}

const LANGUAGE_TABLE: [LanguageEntry; 5] = [
    LanguageEntry { language: Language::Arabic, name: "arabic", part1: "ar", part3: "ara", native: "العربية", script: Script::Arabic },
    LanguageEntry { language: Language::English, name: "english", part1: "en", part3: "eng", native: "English", script: Script::Latin },
    LanguageEntry { language: Language::Chinese, name: "chinese", part1: "zh", part3: "zho", native: "中文", script: Script::Han },
    LanguageEntry { language: Language::Hindi, name: "hindi", part1: "hi", part3: "hin", native: "हिंदी", script: Script::Devanagari },
    LanguageEntry { language: Language::Urdu, name: "urdu", part1: "ur", part3: "urd", native: "اردو", script: Script::Arabic },
];

impl Language {
    /// All supported languages in display order
    pub const ALL: [Language; 5] = [
        Language::Arabic,
        Language::English,
        Language::Chinese,
        Language::Hindi,
        Language::Urdu,
    ];

    fn entry(&self) -> &'static LanguageEntry {
        // The table holds exactly one row per variant, in declaration order
        &LANGUAGE_TABLE[*self as usize]
    }

    /// Lowercase English name ("arabic")
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    /// ISO 639-1 code ("ar")
    pub fn code(&self) -> &'static str {
        self.entry().part1
    }

    /// ISO 639-3 code ("ara")
    pub fn part3_code(&self) -> &'static str {
        self.entry().part3
    }

    /// Name of the language in its own script
    pub fn native_name(&self) -> &'static str {
        self.entry().native
    }

    /// Writing system of the language
    pub fn script(&self) -> Script {
        self.entry().script
    }

    /// Whether text in this language is written right-to-left
    pub fn is_rtl(&self) -> bool {
        self.script() == Script::Arabic
    }

    /// Resolve a two-letter code
    pub fn from_code(code: &str) -> Option<Language> {
        let code = code.trim().to_lowercase();
        LANGUAGE_TABLE.iter().find(|e| e.part1 == code).map(|e| e.language)
    }

    /// Resolve any accepted spelling, failing with `UnsupportedLanguage`
    pub fn parse(value: &str) -> Result<Language, TranslationError> {
        value.parse()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_lowercase();

        if let Some(entry) = LANGUAGE_TABLE.iter().find(|e| {
            e.name == lowered || e.part1 == lowered || e.part3 == lowered || e.native == trimmed
        }) {
            return Ok(entry.language);
        }

        // Fall back to ISO normalization so "chi", "zh-CN"-less variants like "cmn" still map
        if let Ok(part1) = normalize_to_part1_or_part2t(&lowered) {
            if let Some(language) = Language::from_code(&part1) {
                return Ok(language);
            }
        }

        Err(TranslationError::UnsupportedLanguage(trimmed.to_string()))
    }
}

/// Ordered (source, target) language pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguagePair {
    /// Source language
    pub from: Language,
    /// Target language
    pub to: Language,
}

impl LanguagePair {
    pub fn new(from: Language, to: Language) -> Self {
        Self { from, to }
    }

    /// Cache/config key such as "en-ar"
    pub fn key(&self) -> String {
        format!("{}-{}", self.from.code(), self.to.code())
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-3 if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if IsoLanguage::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    } else if normalized_code.len() == 3 {
        // ISO 639-2/B spellings that differ from 639-3 for the languages we care about
        let part3 = match normalized_code.as_str() {
            "chi" => "zho",
            "cmn" => "zho",
            other => other,
        };

        if let Some(lang) = IsoLanguage::from_639_3(part3) {
            if let Some(code_639_1) = lang.to_639_1() {
                return Ok(code_639_1.to_string());
            }
            return Ok(part3.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the English language name from any ISO code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part1_or_part2t(code)?;
    let lang = if normalized.len() == 2 {
        IsoLanguage::from_639_1(&normalized)
    } else {
        IsoLanguage::from_639_3(&normalized)
    }
    .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
