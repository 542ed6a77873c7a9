/*!
 * Model backends for summarization, translation and legal annotation.
 *
 * This module contains the backend seam used by every neural stage:
 * - Ollama: Local LLM server (default)
 * - Mock: Scriptable provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single text-generation request
///
/// Every field except `model` and `prompt` is optional so each stage only
/// sets the decoding knobs it cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// Model name the backend should use
    pub model: String,
    /// Optional system prompt
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_tokens: Option<u32>,
    /// Lower bound on generated tokens, where the backend supports it
    pub min_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Beam width for beam-search decoders
    pub num_beams: Option<u32>,
    /// Length penalty for beam-search decoders
    pub length_penalty: Option<f32>,
}

impl CompletionRequest {
    /// Create a request with only a model and a prompt
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Bound the generated length
    pub fn length_bounds(mut self, min_tokens: Option<u32>, max_tokens: u32) -> Self {
        self.min_tokens = min_tokens;
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Configure beam search
    pub fn beams(mut self, num_beams: u32, length_penalty: f32) -> Self {
        self.num_beams = Some(num_beams);
        self.length_penalty = Some(length_penalty);
        self
    }
}

/// Generated text plus token accounting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Prompt tokens reported by the backend
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the backend
    pub completion_tokens: Option<u64>,
}

/// Common trait for all model backends
///
/// Object safe so components can hold an `Arc<dyn Provider>` and tests can
/// swap in the mock.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Generate text for a request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Make a model resident so the first real request does not pay the load cost
    async fn load_model(&self, model: &str) -> Result<(), ProviderError>;

    /// Release the memory held by a model
    ///
    /// Called between batches and chunks to bound peak memory. Backends that
    /// do not manage residency treat this as a no-op.
    async fn release_model(&self, model: &str) -> Result<(), ProviderError>;

    /// Test the connection to the backend
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod mock;
pub mod ollama;
