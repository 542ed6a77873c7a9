/*!
 * Document pipeline orchestration.
 *
 * `DocumentPipeline::process` runs extraction, summarization and the two
 * legal annotation calls strictly in order and aggregates a
 * `PipelineResult`. `translate_document` is the independent translation
 * path. Both report fractional progress to a `ProgressSink`; on failure a
 * single event with fraction 0 carries the error message.
 */

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agents::{LegalAgent, LlmLegalAgent};
use crate::app_config::{Config, InterfaceLanguage};
use crate::errors::PipelineError;
use crate::extraction::{ExtractedText, Extractor};
use crate::language_utils::Language;
use crate::providers::Provider;
use crate::summarization::{Summarizer, SummaryMethod};
use crate::translation::{Translation, Translator};

/// Receiver of progress updates
pub trait ProgressSink: Send + Sync {
    /// Report a stage message and the completed fraction in `[0, 1]`
    fn report(&self, message: &str, fraction: f32);
}

impl<F> ProgressSink for F
where
    F: Fn(&str, f32) + Send + Sync,
{
    fn report(&self, message: &str, fraction: f32) {
        self(message, fraction)
    }
}

/// Progress sink that discards every update
pub fn no_progress(_message: &str, _fraction: f32) {}

/// One progress update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub message: String,
    pub fraction: f32,
}

impl ProgressEvent {
    pub fn new(message: &str, fraction: f32) -> Self {
        Self { message: message.to_string(), fraction }
    }
}

/// Aggregated outcome of analyzing one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Summary ready for display
    pub summary: String,
    /// How the summary was produced
    pub summary_method: SummaryMethod,
    /// Potential legal issues raised by the document
    pub legal_analysis: String,
    /// Legislation the document relates to
    pub legislation_mapping: String,
    /// Extracted text ready for display
    pub raw_text: String,
}

/// Outcome of translating one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationOutcome {
    pub extracted: ExtractedText,
    pub translation: Translation,
    pub source_language: Language,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Extracting,
    Summarizing,
    Analyzing,
    MappingLegislation,
    AnalysisDone,
    DetectingLanguage,
    Translating,
    TranslationDone,
}

impl Stage {
    fn fraction(self) -> f32 {
        match self {
            Stage::Extracting => 0.1,
            Stage::Summarizing => 0.3,
            Stage::Analyzing => 0.5,
            Stage::MappingLegislation => 0.7,
            Stage::DetectingLanguage => 0.4,
            Stage::Translating => 0.6,
            Stage::AnalysisDone | Stage::TranslationDone => 1.0,
        }
    }

    fn message(self, language: InterfaceLanguage) -> &'static str {
        match language {
            InterfaceLanguage::Arabic => match self {
                Stage::Extracting => "استخراج النص من المستند...",
                Stage::Summarizing => "إنشاء ملخص للمستند...",
                Stage::Analyzing => "تحليل القضايا القانونية...",
                Stage::MappingLegislation => "ربط المستند بالتشريعات الإماراتية...",
                Stage::AnalysisDone => "اكتمل التحليل!",
                Stage::DetectingLanguage => "تحديد لغة المستند...",
                Stage::Translating => "ترجمة المستند...",
                Stage::TranslationDone => "اكتملت الترجمة!",
            },
            InterfaceLanguage::English => match self {
                Stage::Extracting => "Extracting text from document...",
                Stage::Summarizing => "Generating document summary...",
                Stage::Analyzing => "Analyzing legal issues...",
                Stage::MappingLegislation => "Mapping document to UAE legislation...",
                Stage::AnalysisDone => "Analysis complete!",
                Stage::DetectingLanguage => "Detecting document language...",
                Stage::Translating => "Translating document...",
                Stage::TranslationDone => "Translation complete!",
            },
        }
    }
}

fn error_message(language: InterfaceLanguage, error: &PipelineError) -> String {
    match language {
        InterfaceLanguage::Arabic => format!("حدث خطأ: {}", error),
        InterfaceLanguage::English => format!("An error occurred: {}", error),
    }
}

/// Serial document analysis and translation pipeline
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    extractor: Extractor,
    summarizer: Summarizer,
    agent: Arc<dyn LegalAgent>,
    translator: Arc<Translator>,
    max_document_bytes: usize,
    interface_language: InterfaceLanguage,
}

impl DocumentPipeline {
    /// Assemble a pipeline from its components with default limits
    pub fn new(
        extractor: Extractor,
        summarizer: Summarizer,
        agent: Arc<dyn LegalAgent>,
        translator: Arc<Translator>,
    ) -> Self {
        let defaults = Config::default();
        Self {
            extractor,
            summarizer,
            agent,
            translator,
            max_document_bytes: defaults.max_document_bytes,
            interface_language: defaults.interface_language,
        }
    }

    /// Wire every component from configuration around one model backend
    pub fn from_config(config: &Config, provider: Arc<dyn Provider>) -> Self {
        Self::new(
            Extractor::from_config(&config.extraction),
            Summarizer::new(provider.clone(), config.summarization.clone()),
            Arc::new(LlmLegalAgent::new(provider.clone(), config.agent.clone())),
            Arc::new(Translator::new(provider, config.translation.clone())),
        )
        .max_document_bytes(config.max_document_bytes)
        .interface_language(config.interface_language)
    }

    /// Set the largest accepted document size
    pub fn max_document_bytes(mut self, limit: usize) -> Self {
        self.max_document_bytes = limit;
        self
    }

    /// Set the language of progress messages
    pub fn interface_language(mut self, language: InterfaceLanguage) -> Self {
        self.interface_language = language;
        self
    }

    /// The shared translator
    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    /// Analyze a PDF: extract, summarize and annotate
    pub async fn process(&self, pdf: &[u8], progress: &dyn ProgressSink) -> Result<PipelineResult, PipelineError> {
        let result = self.run_analysis(pdf, progress).await;
        if let Err(e) = &result {
            self.report_failure(e, progress);
        }
        result
    }

    /// Translate a PDF into `target`, detecting its source language
    pub async fn translate_document(
        &self,
        pdf: &[u8],
        target: Language,
        progress: &dyn ProgressSink,
    ) -> Result<TranslationOutcome, PipelineError> {
        let result = self.run_translation(pdf, target, progress).await;
        if let Err(e) = &result {
            self.report_failure(e, progress);
        }
        result
    }

    /// Extract the text of a PDF without further processing
    pub async fn extract(&self, pdf: &[u8]) -> Result<ExtractedText, PipelineError> {
        self.check_size(pdf)?;
        let extracted = self.extractor.extract(pdf).await?;
        if extracted.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }
        Ok(extracted)
    }

    async fn run_analysis(&self, pdf: &[u8], progress: &dyn ProgressSink) -> Result<PipelineResult, PipelineError> {
        self.check_size(pdf)?;

        self.advance(Stage::Extracting, progress);
        let extracted = self.extract(pdf).await?;
        info!(
            "Extracted {} characters from {} pages ({:?})",
            extracted.logical.chars().count(),
            extracted.page_count,
            extracted.method
        );

        self.advance(Stage::Summarizing, progress);
        let summary = self.summarizer.summarize(&extracted.logical).await;

        self.advance(Stage::Analyzing, progress);
        let legal_analysis = self
            .agent
            .analyze_legal_issues(&extracted.logical)
            .await
            .map_err(PipelineError::Agent)?;

        self.advance(Stage::MappingLegislation, progress);
        let legislation_mapping = self
            .agent
            .map_to_legislation(&extracted.logical)
            .await
            .map_err(PipelineError::Agent)?;

        self.advance(Stage::AnalysisDone, progress);

        Ok(PipelineResult {
            summary: summary.text,
            summary_method: summary.method,
            legal_analysis,
            legislation_mapping,
            raw_text: extracted.display,
        })
    }

    async fn run_translation(
        &self,
        pdf: &[u8],
        target: Language,
        progress: &dyn ProgressSink,
    ) -> Result<TranslationOutcome, PipelineError> {
        self.check_size(pdf)?;

        self.advance(Stage::Extracting, progress);
        let extracted = self.extract(pdf).await?;

        self.advance(Stage::DetectingLanguage, progress);
        let source_language = self.translator.detect_language(&extracted.logical);
        info!("Detected source language: {}", source_language);
        if source_language == target {
            return Err(PipelineError::SameLanguage(target));
        }

        self.advance(Stage::Translating, progress);
        let translation = self.translator.translate(&extracted.logical, source_language, target).await?;

        self.advance(Stage::TranslationDone, progress);

        Ok(TranslationOutcome { extracted, translation, source_language })
    }

    fn check_size(&self, pdf: &[u8]) -> Result<(), PipelineError> {
        if pdf.len() > self.max_document_bytes {
            return Err(PipelineError::DocumentTooLarge { size: pdf.len(), limit: self.max_document_bytes });
        }
        Ok(())
    }

    fn advance(&self, stage: Stage, progress: &dyn ProgressSink) {
        progress.report(stage.message(self.interface_language), stage.fraction());
    }

    fn report_failure(&self, error: &PipelineError, progress: &dyn ProgressSink) {
        error!("Pipeline failed: {}", error);
        progress.report(&error_message(self.interface_language, error), 0.0);
    }
}
