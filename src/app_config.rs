use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::Path;

use crate::language_utils::{Language, LanguagePair};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Language of progress messages
    #[serde(default)]
    pub interface_language: InterfaceLanguage,

    /// Largest accepted PDF in bytes
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,

    /// Model backend
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Text layer and OCR settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Summarizer settings
    #[serde(default)]
    pub summarization: SummarizationConfig,

    /// Translator settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Legal annotation settings
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Language used for progress messages
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceLanguage {
    #[default]
    Arabic,
    English,
}

impl std::str::FromStr for InterfaceLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "arabic" | "ar" => Ok(Self::Arabic),
            "english" | "en" => Ok(Self::English),
            _ => Err(anyhow!("Invalid interface language: {}", s)),
        }
    }
}

/// Ollama backend configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Service URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Evict models between batches to bound memory
    #[serde(default = "default_true")]
    pub unload_between_batches: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            unload_between_batches: true,
        }
    }
}

/// Text layer and OCR configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Fall back to OCR when the PDF has no text layer
    #[serde(default = "default_true")]
    pub ocr_enabled: bool,

    /// Rasterization resolution for OCR
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Tesseract language set
    #[serde(default = "default_ocr_languages")]
    pub ocr_languages: String,

    /// Path to the tesseract binary (relies on PATH by default)
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,

    /// Path to poppler's pdftoppm binary
    #[serde(default = "default_pdftoppm_path")]
    pub pdftoppm_path: String,

    /// Per-invocation timeout for external tools
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_enabled: true,
            dpi: default_dpi(),
            ocr_languages: default_ocr_languages(),
            tesseract_path: default_tesseract_path(),
            pdftoppm_path: default_pdftoppm_path(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

/// Summarizer configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SummarizationConfig {
    /// Summarization model
    #[serde(default = "default_model")]
    pub model: String,

    /// Characters per chunk
    #[serde(default = "default_summary_chunk_size")]
    pub chunk_size: usize,

    /// Lower bound on summary tokens per chunk
    #[serde(default = "default_summary_min_length")]
    pub min_length: u32,

    /// Upper bound on summary tokens per chunk
    #[serde(default = "default_summary_max_length")]
    pub max_length: u32,

    /// Chunks processed between model releases
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Characters kept from a chunk whose summary failed
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    /// Extractive fallback weights
    #[serde(default)]
    pub extractive: ExtractiveConfig,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            chunk_size: default_summary_chunk_size(),
            min_length: default_summary_min_length(),
            max_length: default_summary_max_length(),
            batch_size: default_batch_size(),
            excerpt_chars: default_excerpt_chars(),
            extractive: ExtractiveConfig::default(),
        }
    }
}

/// Sentence scoring for the extractive summary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractiveConfig {
    /// Sentences shorter than this many characters are ignored
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,

    /// Number of sentences kept
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Weight of the position bias (1 at the ends, 0 in the middle)
    #[serde(default = "default_position_weight")]
    pub position_weight: f32,

    /// Bonus for sentences inside the length band
    #[serde(default = "default_length_bonus")]
    pub length_bonus: f32,

    /// Shortest sentence earning the length bonus
    #[serde(default = "default_length_band_min")]
    pub length_band_min: usize,

    /// Longest sentence earning the length bonus
    #[serde(default = "default_length_band_max")]
    pub length_band_max: usize,
}

impl Default for ExtractiveConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: default_min_sentence_chars(),
            top_n: default_top_n(),
            position_weight: default_position_weight(),
            length_bonus: default_length_bonus(),
            length_band_min: default_length_band_min(),
            length_band_max: default_length_band_max(),
        }
    }
}

/// Translator configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Multilingual model used for every pair without an override
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Per-pair model overrides keyed like "en-ar"
    #[serde(default)]
    pub pair_models: BTreeMap<String, String>,

    /// Characters per chunk
    #[serde(default = "default_translation_chunk_size")]
    pub chunk_size: usize,

    /// Whitespace tokens kept from each chunk
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,

    /// Upper bound on generated tokens per chunk
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Beam width
    #[serde(default = "default_num_beams")]
    pub num_beams: u32,

    /// Length penalty for beam search
    #[serde(default = "default_length_penalty")]
    pub length_penalty: f32,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            pair_models: BTreeMap::new(),
            chunk_size: default_translation_chunk_size(),
            max_input_tokens: default_max_input_tokens(),
            max_new_tokens: default_max_new_tokens(),
            num_beams: default_num_beams(),
            length_penalty: default_length_penalty(),
        }
    }
}

impl TranslationConfig {
    /// Model for an ordered pair, falling back to the default model
    pub fn model_for(&self, pair: &LanguagePair) -> String {
        self.pair_models
            .get(&pair.key())
            .filter(|m| !m.is_empty())
            .cloned()
            .unwrap_or_else(|| self.default_model.clone())
    }
}

/// Legal annotation configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AgentConfig {
    /// Model answering the legal tasks
    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens
    #[serde(default = "default_agent_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_agent_max_tokens(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_max_document_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_true() -> bool {
    true
}

fn default_dpi() -> u32 {
    300
}

fn default_ocr_languages() -> String {
    "ara+eng".to_string()
}

fn default_tesseract_path() -> String {
    "tesseract".to_string()
}

fn default_pdftoppm_path() -> String {
    "pdftoppm".to_string()
}

fn default_tool_timeout_secs() -> u64 {
    300
}

fn default_model() -> String {
    "aya-expanse:8b".to_string()
}

fn default_summary_chunk_size() -> usize {
    500
}

fn default_summary_min_length() -> u32 {
    30
}

fn default_summary_max_length() -> u32 {
    130
}

fn default_batch_size() -> usize {
    2
}

fn default_excerpt_chars() -> usize {
    200
}

fn default_min_sentence_chars() -> usize {
    20
}

fn default_top_n() -> usize {
    3
}

fn default_position_weight() -> f32 {
    1.0
}

fn default_length_bonus() -> f32 {
    0.5
}

fn default_length_band_min() -> usize {
    40
}

fn default_length_band_max() -> usize {
    200
}

fn default_translation_chunk_size() -> usize {
    450
}

fn default_max_input_tokens() -> usize {
    512
}

fn default_max_new_tokens() -> u32 {
    512
}

fn default_num_beams() -> u32 {
    2
}

fn default_length_penalty() -> f32 {
    0.6
}

fn default_temperature() -> f32 {
    0.3
}

fn default_agent_max_tokens() -> u32 {
    4000
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path.display(), e))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.max_document_bytes == 0 {
            return Err(anyhow!("max_document_bytes must be greater than zero"));
        }

        url::Url::parse(&self.provider.endpoint)
            .map_err(|e| anyhow!("Invalid provider endpoint '{}': {}", self.provider.endpoint, e))?;

        if !(72..=1200).contains(&self.extraction.dpi) {
            return Err(anyhow!("OCR dpi must be between 72 and 1200, got {}", self.extraction.dpi));
        }
        if self.extraction.ocr_languages.trim().is_empty() {
            return Err(anyhow!("OCR language set must not be empty"));
        }

        let summarization = &self.summarization;
        if summarization.chunk_size == 0 || summarization.batch_size == 0 {
            return Err(anyhow!("Summarization chunk_size and batch_size must be greater than zero"));
        }
        if summarization.min_length > summarization.max_length {
            return Err(anyhow!(
                "Summarization min_length ({}) exceeds max_length ({})",
                summarization.min_length, summarization.max_length
            ));
        }
        if summarization.extractive.top_n == 0 {
            return Err(anyhow!("Extractive top_n must be greater than zero"));
        }

        let translation = &self.translation;
        if translation.chunk_size == 0 || translation.max_input_tokens == 0 || translation.num_beams == 0 {
            return Err(anyhow!("Translation chunk_size, max_input_tokens and num_beams must be greater than zero"));
        }
        for key in translation.pair_models.keys() {
            let (from, to) = key.split_once('-')
                .ok_or_else(|| anyhow!("Invalid language pair key '{}', expected e.g. \"en-ar\"", key))?;
            Language::parse(from)?;
            Language::parse(to)?;
        }

        if !(0.0..=2.0).contains(&self.agent.temperature) {
            return Err(anyhow!("Agent temperature must be between 0.0 and 2.0"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LogLevel::default(),
            interface_language: InterfaceLanguage::default(),
            max_document_bytes: default_max_document_bytes(),
            provider: ProviderConfig::default(),
            extraction: ExtractionConfig::default(),
            summarization: SummarizationConfig::default(),
            translation: TranslationConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}
