use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils::Language;
use crate::pipeline::{DocumentPipeline, PipelineResult, TranslationOutcome};
use crate::providers::Provider;
use crate::providers::ollama::Ollama;

// @module: Application controller for document processing

/// Main application controller wiring the pipeline from configuration
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Pipeline shared by every command
    pipeline: DocumentPipeline,
}

impl Controller {
    // @method: Create a controller backed by the configured Ollama server
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = &config.provider;
        let ollama = Ollama::new_with_config(
            &provider.endpoint,
            provider.timeout_secs,
            provider.retry_count,
            provider.retry_backoff_ms,
            provider.unload_between_batches,
        )
        .context("Failed to create Ollama client")?;

        Ok(Self::with_provider(config, Arc::new(ollama)))
    }

    /// Create a controller around an explicit model backend
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        let pipeline = DocumentPipeline::from_config(&config, provider);
        Self { config, pipeline }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze a PDF and write or print the JSON result
    pub async fn run_analyze(&self, input_file: &Path, output_file: Option<&Path>) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let pdf = FileManager::read_document(input_file, self.config.max_document_bytes)?;

        let progress_bar = Self::create_progress_bar();
        let sink = |message: &str, fraction: f32| Self::update_progress(&progress_bar, message, fraction);
        let result = self.pipeline.process(&pdf, &sink).await;
        progress_bar.finish_and_clear();

        let result = result.with_context(|| format!("Failed to analyze {}", input_file.display()))?;
        info!("Analyzed {} in {}", input_file.display(), Self::format_duration(start_time.elapsed()));

        self.emit(&result, output_file)?;
        Ok(result)
    }

    /// Translate a PDF into `target` and write or print the JSON outcome
    pub async fn run_translate(
        &self,
        input_file: &Path,
        target: Language,
        output_file: Option<&Path>,
    ) -> Result<TranslationOutcome> {
        let start_time = Instant::now();
        let pdf = FileManager::read_document(input_file, self.config.max_document_bytes)?;

        let progress_bar = Self::create_progress_bar();
        let sink = |message: &str, fraction: f32| Self::update_progress(&progress_bar, message, fraction);
        let outcome = self.pipeline.translate_document(&pdf, target, &sink).await;
        progress_bar.finish_and_clear();

        let outcome = outcome.with_context(|| format!("Failed to translate {}", input_file.display()))?;
        if outcome.translation.degraded {
            warn!("Translation failed, the output contains the original text");
        }
        info!(
            "Translated {} from {} to {} in {} ({})",
            input_file.display(),
            outcome.source_language,
            target,
            Self::format_duration(start_time.elapsed()),
            self.pipeline.translator().token_usage().summary()
        );

        self.emit(&outcome, output_file)?;
        Ok(outcome)
    }

    /// Detect the language of a PDF's text
    pub async fn run_detect(&self, input_file: &Path) -> Result<Language> {
        let pdf = FileManager::read_document(input_file, self.config.max_document_bytes)?;
        let extracted = self
            .pipeline
            .extract(&pdf)
            .await
            .with_context(|| format!("Failed to extract {}", input_file.display()))?;

        let language = self.pipeline.translator().detect_language(&extracted.logical);
        println!("{} ({})", language.name(), language.code());
        Ok(language)
    }

    /// Table of supported languages
    pub fn run_languages(&self) -> String {
        self.pipeline
            .translator()
            .supported_languages()
            .iter()
            .map(|language| {
                format!(
                    "{:<3} {:<4} {:<8} {}",
                    language.code(),
                    language.part3_code(),
                    language.name(),
                    language.native_name()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Where a command writes its JSON
    ///
    /// An explicit path wins. With `save_next_to_input`, the result goes next
    /// to the input, e.g. `contract.pdf` becomes `contract.analysis.json`.
    /// Otherwise the JSON is printed.
    pub fn output_path_for(
        input_file: &Path,
        suffix: &str,
        explicit: Option<&Path>,
        save_next_to_input: bool,
    ) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None if save_next_to_input => Some(FileManager::generate_output_path(input_file, suffix, "json")),
            None => None,
        }
    }

    fn emit<T: Serialize>(&self, value: &T, output_file: Option<&Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize result to JSON")?;
        match output_file {
            Some(path) => {
                FileManager::write_output(path, &json)?;
                info!("Success: {}", path.display());
            }
            None => println!("{}", json),
        }
        Ok(())
    }

    fn create_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {percent}% {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    fn update_progress(progress_bar: &ProgressBar, message: &str, fraction: f32) {
        progress_bar.set_message(message.to_string());
        progress_bar.set_position((fraction.clamp(0.0, 1.0) * 100.0).round() as u64);
    }

    /// Format a duration in a human-readable form
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{:.1}s", duration.as_secs_f64())
        }
    }
}
