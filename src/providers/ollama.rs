use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API, without trailing slash
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Whether `release_model` actually evicts the model
    unload_between_batches: bool,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    /// How long to keep the model loaded in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Top-k sampling (default: 40)
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// One entry of `/api/tags`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name including tag, e.g. "aya:8b"
    pub name: String,
    /// Size on disk in bytes
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
            keep_alive: None,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the keep-alive duration
    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    fn options_mut(&mut self) -> &mut GenerationOptions {
        self.options.get_or_insert_with(GenerationOptions::default)
    }

    /// Build an Ollama request from a backend-neutral completion request
    ///
    /// Ollama has no beam search: a beam request is decoded greedily
    /// (temperature 0, top-k 1) unless an explicit temperature is given.
    /// `min_tokens` has no Ollama counterpart and is dropped.
    pub fn from_completion(request: &CompletionRequest) -> Self {
        let mut generation = Self::new(request.model.clone(), request.prompt.clone());
        if let Some(system) = &request.system {
            generation = generation.system(system.clone());
        }
        if let Some(max_tokens) = request.max_tokens {
            generation.options_mut().num_predict = Some(max_tokens);
        }
        match (request.temperature, request.num_beams) {
            (Some(temperature), _) => generation.options_mut().temperature = Some(temperature),
            (None, Some(_)) => {
                let options = generation.options_mut();
                options.temperature = Some(0.0);
                options.top_k = Some(1);
            }
            (None, None) => {}
        }
        generation
    }
}

impl Ollama {
    /// Create a new Ollama client from a base URL such as `http://localhost:11434`
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        Self::new_with_config(endpoint, timeout_secs, 3, 1000, false)
    }

    /// Create a new Ollama client with configuration
    ///
    /// Note: Ollama typically uses HTTP/1.1, so we don't force HTTP/2.
    pub fn new_with_config(
        endpoint: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        unload_between_batches: bool,
    ) -> Result<Self, ProviderError> {
        let base_url = normalize_endpoint(endpoint)?;

        Ok(Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
            unload_between_batches,
        })
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let response_text = response.text().await
                            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read Ollama response body: {}", e)))?;
                        return parse_generation_response(&response_text);
                    }

                    let error_text = response.text().await
                        .unwrap_or_else(|_| "Failed to get error response text".to_string());

                    if status.as_u16() == 404 {
                        return Err(ProviderError::ModelNotFound(request.model.clone()));
                    }

                    if status.is_server_error() {
                        // Server error - can retry
                        error!("Ollama API error ({}): {} - attempt {}/{}", status, error_text, attempt + 1, self.max_retries + 1);
                        last_error = Some(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    } else {
                        // Client error - don't retry
                        error!("Ollama API error ({}): {}", status, error_text);
                        return Err(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    }
                }
                Err(e) => {
                    // Network error - can retry
                    error!("Ollama API network error: {} - attempt {}/{}", e, attempt + 1, self.max_retries + 1);
                    last_error = Some(ProviderError::ConnectionError(format!("Failed to send request to Ollama API: {}", e)));
                }
            }

            attempt += 1;

            // If we have more retries left, wait with exponential backoff
            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!("Ollama API request failed after {} attempts", self.max_retries + 1))
        }))
    }

    /// List locally available models
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError { status_code: status.as_u16(), message });
        }

        let tags: TagsResponse = response.json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama tags response: {}", e)))?;
        Ok(tags.models)
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self.client.get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama: {}", e)))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;

        response["version"].as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        if request.min_tokens.is_some() {
            debug!("Ollama ignores min_tokens for model {}", request.model);
        }
        let response = self.generate(&GenerationRequest::from_completion(&request)).await?;
        Ok(CompletionResponse {
            text: response.response.trim().to_string(),
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
        })
    }

    async fn load_model(&self, model: &str) -> Result<(), ProviderError> {
        let available = self.list_models().await?;
        let Some(info) = available.iter().find(|m| model_matches(&m.name, model)) else {
            return Err(ProviderError::ModelNotFound(model.to_string()));
        };

        // An empty prompt makes Ollama load the model without generating
        self.generate(&GenerationRequest::new(model, "")).await?;
        debug!("Loaded model {} ({:.1} GB)", info.name, info.size as f64 / 1_073_741_824.0);
        Ok(())
    }

    async fn release_model(&self, model: &str) -> Result<(), ProviderError> {
        if !self.unload_between_batches {
            return Ok(());
        }

        match self.generate(&GenerationRequest::new(model, "").keep_alive("0")).await {
            Ok(_) => {
                debug!("Released model {}", model);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to release model {}: {}", model, e);
                Err(e)
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let version = self.version().await?;
        debug!("Connected to Ollama {} at {}", version, self.base_url);
        Ok(())
    }
}

/// Validate an endpoint and strip any trailing slash
fn normalize_endpoint(endpoint: &str) -> Result<String, ProviderError> {
    let trimmed = endpoint.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| ProviderError::ConnectionError(format!("Invalid Ollama endpoint '{}': {}", endpoint, e)))?;
    if parsed.host_str().is_none() {
        return Err(ProviderError::ConnectionError(format!("Ollama endpoint '{}' has no host", endpoint)));
    }

    Ok(with_scheme.trim_end_matches('/').to_string())
}

/// Ollama reports "name:latest" for models requested as "name"
fn model_matches(available: &str, requested: &str) -> bool {
    available == requested
        || (!requested.contains(':') && available.strip_suffix(":latest") == Some(requested))
}

/// Parse a generate response, tolerating a streamed JSONL body
fn parse_generation_response(body: &str) -> Result<GenerationResponse, ProviderError> {
    match serde_json::from_str::<GenerationResponse>(body) {
        Ok(response) => Ok(response),
        Err(e) => {
            let preview: String = body.chars().take(500).collect();
            error!("Failed to parse Ollama API response: {}. Raw response (first 500 chars): {}", e, preview);

            // Streaming responses carry one JSON object per line; concatenate the pieces
            let mut parts = Vec::new();
            for line in body.lines().filter(|l| !l.trim().is_empty()) {
                let piece = serde_json::from_str::<GenerationResponse>(line)
                    .map_err(|_| ProviderError::ParseError(format!("Failed to parse Ollama API response: {}", e)))?;
                parts.push(piece);
            }

            let last = parts.pop()
                .ok_or_else(|| ProviderError::ParseError("Empty response from Ollama API".to_string()))?;
            let mut text: String = parts.iter().map(|p| p.response.as_str()).collect();
            text.push_str(&last.response);

            Ok(GenerationResponse { response: text, ..last })
        }
    }
}
