/*!
 * Core translation service implementation.
 *
 * This module contains the `Translator`, which resolves a model per language
 * pair, translates text chunk by chunk through the model backend and applies
 * target-specific post-processing.
 */

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::language_utils::{self, Language, LanguagePair};
use crate::providers::{CompletionRequest, Provider};
use crate::text::split;

use super::cache::ModelCache;
use super::detection;
use super::formatting::TranslationFormatter;

/// Token usage statistics for tracking model consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on model requests
    pub api_duration: Duration,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
        }
    }

    /// Add token usage numbers
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Prompt tokens: {}, completion tokens: {}, total: {}, model time: {:.1}s",
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.api_duration.as_secs_f64()
        )
    }
}

/// Result of translating one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    /// Translated text, or the original text when `degraded`
    pub text: String,
    /// Target language
    pub target: Language,
    /// Number of chunks sent to the model
    pub chunks: usize,
    /// Generation failed and the original text was returned
    pub degraded: bool,
}

/// Chunked neural translator with a per-instance model cache
#[derive(Debug)]
pub struct Translator {
    provider: Arc<dyn Provider>,
    config: TranslationConfig,
    cache: ModelCache,
    token_usage: Mutex<TokenUsageStats>,
}

impl Translator {
    pub fn new(provider: Arc<dyn Provider>, config: TranslationConfig) -> Self {
        Self {
            provider,
            config,
            cache: ModelCache::new(),
            token_usage: Mutex::new(TokenUsageStats::new()),
        }
    }

    /// Languages this translator accepts
    pub fn supported_languages(&self) -> &'static [Language] {
        &Language::ALL
    }

    /// Detect the language of a text, defaulting to English
    pub fn detect_language(&self, text: &str) -> Language {
        detection::detect_language(text)
    }

    /// The model cache, exposed for inspection and `clear()`
    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Snapshot of token usage so far
    pub fn token_usage(&self) -> TokenUsageStats {
        self.token_usage.lock().clone()
    }

    /// Translate between languages given by name or code
    pub async fn translate_named(&self, text: &str, from: &str, to: &str) -> Result<Translation, TranslationError> {
        let from = Language::parse(from)?;
        let to = Language::parse(to)?;
        self.translate(text, from, to).await
    }

    /// Translate text from one supported language to another
    ///
    /// Fails only when no model can be loaded for the pair. A generation
    /// failure returns the original text with `degraded` set.
    pub async fn translate(&self, text: &str, from: Language, to: Language) -> Result<Translation, TranslationError> {
        let pair = LanguagePair::new(from, to);
        let model = self.resolve_model(pair).await
            .ok_or(TranslationError::ModelUnavailable { from, to })?;

        let prepared = TranslationFormatter::preprocess(text);
        if prepared.is_empty() {
            debug!("Nothing left to translate after preprocessing");
            return Ok(Translation { text: String::new(), target: to, chunks: 0, degraded: false });
        }

        let chunks = split(&prepared, self.config.chunk_size);
        let system = translation_prompt(from, to);
        let mut outputs = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            let input = truncate_tokens(chunk, self.config.max_input_tokens);
            let request = CompletionRequest::new(model.clone(), input)
                .system(system.clone())
                .length_bounds(None, self.config.max_new_tokens)
                .beams(self.config.num_beams, self.config.length_penalty);

            let started = Instant::now();
            let result = self.provider.complete(request).await;

            match result {
                Ok(response) if !response.text.trim().is_empty() => {
                    let mut usage = self.token_usage.lock();
                    usage.add_token_usage(response.prompt_tokens, response.completion_tokens);
                    usage.api_duration += started.elapsed();
                    outputs.push(response.text.trim().to_string());
                }
                Ok(_) => {
                    warn!("Empty translation for chunk {}/{} ({})", index + 1, chunks.len(), pair);
                    return Ok(Translation { text: text.to_string(), target: to, chunks: chunks.len(), degraded: true });
                }
                Err(e) => {
                    warn!("Translation of chunk {}/{} ({}) failed: {}", index + 1, chunks.len(), pair, e);
                    return Ok(Translation { text: text.to_string(), target: to, chunks: chunks.len(), degraded: true });
                }
            }

            if index + 1 < chunks.len() {
                if let Err(e) = self.provider.release_model(&model).await {
                    warn!("Failed to release translation model between chunks: {}", e);
                }
            }
        }

        info!("Translated {} chunks ({})", chunks.len(), pair);

        Ok(Translation {
            text: TranslationFormatter::post_process(&outputs.join(" "), to),
            target: to,
            chunks: chunks.len(),
            degraded: false,
        })
    }

    /// Cached model for a pair, loading it on first use
    async fn resolve_model(&self, pair: LanguagePair) -> Option<String> {
        self.cache
            .get_or_load(pair, move || async move {
                let model = self.config.model_for(&pair);
                match self.provider.load_model(&model).await {
                    Ok(()) => {
                        info!("Loaded translation model {} for {}", model, pair);
                        Some(model)
                    }
                    Err(e) => {
                        warn!("Could not load translation model {} for {}: {}", model, pair, e);
                        None
                    }
                }
            })
            .await
    }
}

/// System prompt for one direction
fn translation_prompt(from: Language, to: Language) -> String {
    let name = |language: Language| {
        language_utils::get_language_name(language.code()).unwrap_or_else(|_| language.name().to_string())
    };
    format!(
        "Translate the user's text from {} to {}. Output only the translation, without notes or explanations.",
        name(from),
        name(to)
    )
}

/// Keep at most `max_tokens` estimated tokens
///
/// Whitespace-separated words count as one token each. Han characters are
/// unspaced, so each one counts as a token on its own.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    let mut kept: Vec<String> = Vec::new();
    let mut budget = max_tokens;

    for word in text.split_whitespace() {
        let cost = estimate_tokens(word);
        if cost <= budget {
            kept.push(word.to_string());
            budget -= cost;
            continue;
        }

        let mut partial = String::new();
        for c in word.chars() {
            let c_cost = usize::from(is_han(c));
            if c_cost > budget {
                break;
            }
            budget -= c_cost;
            partial.push(c);
        }
        if partial.chars().any(is_han) {
            kept.push(partial);
        }
        debug!("Truncated chunk to {} tokens", max_tokens);
        break;
    }

    kept.join(" ")
}

/// Token estimate for one whitespace-free word
fn estimate_tokens(word: &str) -> usize {
    match word.chars().filter(|c| is_han(*c)).count() {
        0 => 1,
        han => han,
    }
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}')
}
