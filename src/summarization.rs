/*!
 * Chunk-wise document summarization.
 *
 * The abstractive path summarizes each chunk through the model backend and
 * releases the model between batches to bound memory. A chunk whose summary
 * fails is replaced by an excerpt. When no chunk can be summarized at all, or
 * the model cannot be loaded, the summary is built extractively from the
 * highest-scoring sentences of the document instead. Summarization never
 * fails; how the summary was produced is reported in `Summary::method`.
 */

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app_config::{ExtractiveConfig, SummarizationConfig};
use crate::providers::{CompletionRequest, Provider};
use crate::text::{clean_for_display, split, split_sentences};

const SUMMARY_SYSTEM_PROMPT: &str = "You are a summarization model. Summarize the user's text in the \
same language it is written in. Output only the summary, without any preamble.";

/// How a summary was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryMethod {
    /// Every chunk was summarized by the model
    Abstractive,
    /// Some chunks fell back to an excerpt
    Partial { fallback_chunks: usize },
    /// The model path failed entirely and sentences were selected instead
    Extractive,
}

/// Document summary ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Cleaned and reshaped summary text
    pub text: String,
    /// How the text was produced
    pub method: SummaryMethod,
}

/// Chunked abstractive summarizer with extractive fallback
#[derive(Debug, Clone)]
pub struct Summarizer {
    provider: Arc<dyn Provider>,
    config: SummarizationConfig,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn Provider>, config: SummarizationConfig) -> Self {
        Self { provider, config }
    }

    /// Summarize text in logical order
    pub async fn summarize(&self, text: &str) -> Summary {
        if text.trim().is_empty() {
            return Summary { text: String::new(), method: SummaryMethod::Extractive };
        }

        let model = &self.config.model;
        if let Err(e) = self.provider.load_model(model).await {
            warn!("Summarization model {} unavailable, using extractive summary: {}", model, e);
            return self.extractive(text);
        }

        let chunks = split(text, self.config.chunk_size);
        let batch_size = self.config.batch_size.max(1);
        let batch_count = chunks.len().div_ceil(batch_size);
        let mut summaries = Vec::with_capacity(chunks.len());
        let mut fallback_chunks = 0;

        for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
            for chunk in batch {
                match self.summarize_chunk(chunk).await {
                    Some(summary) => summaries.push(summary),
                    None => {
                        fallback_chunks += 1;
                        summaries.push(excerpt(chunk, self.config.excerpt_chars));
                    }
                }
            }

            if batch_index + 1 < batch_count {
                if let Err(e) = self.provider.release_model(model).await {
                    warn!("Failed to release summarization model between batches: {}", e);
                }
            }
        }

        if fallback_chunks == chunks.len() {
            warn!("All {} chunk summaries failed, using extractive summary", chunks.len());
            return self.extractive(text);
        }

        let method = if fallback_chunks == 0 {
            SummaryMethod::Abstractive
        } else {
            info!("{} of {} chunks fell back to excerpts", fallback_chunks, chunks.len());
            SummaryMethod::Partial { fallback_chunks }
        };

        Summary {
            text: clean_for_display(&summaries.join(" ")),
            method,
        }
    }

    async fn summarize_chunk(&self, chunk: &str) -> Option<String> {
        let request = CompletionRequest::new(self.config.model.clone(), chunk)
            .system(SUMMARY_SYSTEM_PROMPT)
            .length_bounds(Some(self.config.min_length), self.config.max_length)
            .temperature(0.0);

        match self.provider.complete(request).await {
            Ok(response) if !response.text.trim().is_empty() => Some(response.text.trim().to_string()),
            Ok(_) => {
                warn!("Empty summary for chunk of {} characters", chunk.chars().count());
                None
            }
            Err(e) => {
                warn!("Chunk summarization failed: {}", e);
                None
            }
        }
    }

    /// Extractive summary, or an excerpt when no sentence qualifies
    fn extractive(&self, text: &str) -> Summary {
        let mut selected = extractive_summary(text, &self.config.extractive);
        if selected.is_empty() {
            debug!("No sentence qualified for the extractive summary, using an excerpt");
            selected = excerpt(text, self.config.excerpt_chars);
        }
        Summary {
            text: clean_for_display(&selected),
            method: SummaryMethod::Extractive,
        }
    }
}

/// First `max_chars` characters, with "..." appended when anything was cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(max_chars).collect();
    format!("{}...", head.trim_end())
}

/// Score a sentence by position and length
///
/// Position follows a U-shape: first and last sentences score
/// `position_weight`, the middle of the document scores 0. Sentences whose
/// length falls inside the configured band earn `length_bonus`.
pub fn score_sentence(index: usize, total: usize, char_len: usize, config: &ExtractiveConfig) -> f32 {
    let position = if total > 1 {
        let relative = index as f32 / (total - 1) as f32;
        (2.0 * relative - 1.0).abs()
    } else {
        1.0
    };

    let in_band = (config.length_band_min..=config.length_band_max).contains(&char_len);
    let bonus = if in_band { config.length_bonus } else { 0.0 };

    config.position_weight * position + bonus
}

/// Indices of the `n` best scores, returned in ascending (document) order
///
/// Ties keep the earlier sentence.
pub fn select_top_in_order(scores: &[f32], n: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..scores.len()).collect();
    ranked.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
    ranked.truncate(n);
    ranked.sort_unstable();
    ranked
}

/// Pick the top sentences of a text and join them in document order
///
/// Returns an empty string when no sentence reaches `min_sentence_chars`.
pub fn extractive_summary(text: &str, config: &ExtractiveConfig) -> String {
    let sentences: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|s| s.chars().count() >= config.min_sentence_chars)
        .collect();

    if sentences.is_empty() {
        return String::new();
    }

    let total = sentences.len();
    let scores: Vec<f32> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| score_sentence(i, total, s.chars().count(), config))
        .collect();

    select_top_in_order(&scores, config.top_n)
        .into_iter()
        .map(|i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
