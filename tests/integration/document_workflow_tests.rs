/*!
 * End-to-end tests of document analysis
 */

use std::sync::Arc;

use lexdoc::app_config::{Config, InterfaceLanguage};
use lexdoc::app_controller::Controller;
use lexdoc::errors::PipelineError;
use lexdoc::extraction::LopdfTextLayer;
use lexdoc::pipeline::PipelineResult;
use lexdoc::providers::mock::MockProvider;
use lexdoc::summarization::SummaryMethod;
use lexdoc::text::normalizer::contains_arabic;

use crate::common::{self, CannedAgent, FixedOcr, FixedTextLayer, ProgressLog};

/// A searchable three page Arabic PDF fills every result field
#[tokio::test]
async fn test_process_withSearchableArabicPdf_shouldFillAllFields() {
    common::init_logging();
    let provider = Arc::new(MockProvider::working().with_custom_response(|_| "ملخص العقد".to_string()));
    let pipeline = common::build_pipeline(
        provider.clone(),
        Arc::new(FixedTextLayer(common::arabic_contract_pages())),
        None,
        CannedAgent::default(),
    );
    let progress = ProgressLog::default();

    let result = pipeline.process(b"%PDF-1.7", &progress.sink()).await.unwrap();

    assert!(!result.summary.is_empty());
    assert!(result.summary.chars().count() < result.raw_text.chars().count());
    assert!(!result.legal_analysis.is_empty());
    assert!(!result.legislation_mapping.is_empty());
    assert!(!result.raw_text.is_empty());
    assert_eq!(result.summary_method, SummaryMethod::Abstractive);
    assert!(contains_arabic(&result.raw_text));
    assert_eq!(progress.fractions(), vec![0.1, 0.3, 0.5, 0.7, 1.0]);
}

/// An image-only PDF goes through OCR
#[tokio::test]
async fn test_process_withImageOnlyPdf_shouldUseOcrText() {
    let provider = Arc::new(MockProvider::working());
    let ocr = FixedOcr::new(vec!["عقد عمل بين الشركة والموظف لمدة سنتين.".to_string()]);
    let pipeline = common::build_pipeline(
        provider,
        Arc::new(LopdfTextLayer),
        Some(Arc::new(ocr.clone())),
        CannedAgent::default(),
    );

    let result = pipeline.process(&common::image_only_pdf(1), &lexdoc::pipeline::no_progress).await.unwrap();

    assert_eq!(ocr.call_count(), 1);
    assert!(contains_arabic(&result.raw_text));
}

/// A failing summarization model still yields a summary
#[tokio::test]
async fn test_process_withFailingSummarizer_shouldReturnExtractiveSummary() {
    let provider = Arc::new(MockProvider::failing());
    let pipeline = common::build_pipeline(
        provider,
        Arc::new(FixedTextLayer(common::arabic_contract_pages())),
        None,
        CannedAgent::default(),
    );

    let result = pipeline.process(b"%PDF-1.7", &lexdoc::pipeline::no_progress).await.unwrap();

    assert_eq!(result.summary_method, SummaryMethod::Extractive);
    assert!(!result.summary.trim().is_empty());
}

#[tokio::test]
async fn test_process_withBlankPdf_shouldFailWithEmptyDocumentAndReportError() {
    let pipeline = common::build_pipeline(
        Arc::new(MockProvider::working()),
        Arc::new(LopdfTextLayer),
        None,
        CannedAgent::default(),
    );
    let progress = ProgressLog::default();

    let result = pipeline.process(&common::image_only_pdf(2), &progress.sink()).await;

    assert!(matches!(result, Err(PipelineError::EmptyDocument)));
    let events = progress.events();
    assert_eq!(events.last().map(|e| e.fraction), Some(0.0));
    assert!(events.last().unwrap().message.contains("No readable text"));
}

#[tokio::test]
async fn test_process_withFailingAgent_shouldFailWithAgentError() {
    let pipeline = common::build_pipeline(
        Arc::new(MockProvider::working()),
        Arc::new(FixedTextLayer(common::arabic_contract_pages())),
        None,
        CannedAgent { fail: true },
    );
    let progress = ProgressLog::default();

    let result = pipeline.process(b"%PDF", &progress.sink()).await;

    assert!(matches!(result, Err(PipelineError::Agent(_))));
    assert_eq!(progress.fractions(), vec![0.1, 0.3, 0.5, 0.0]);
}

#[tokio::test]
async fn test_process_withArabicInterface_shouldLocalizeMessages() {
    let pipeline = common::build_pipeline(
        Arc::new(MockProvider::working()),
        Arc::new(FixedTextLayer(common::arabic_contract_pages())),
        None,
        CannedAgent::default(),
    )
    .interface_language(InterfaceLanguage::Arabic);
    let progress = ProgressLog::default();

    pipeline.process(b"%PDF", &progress.sink()).await.unwrap();

    let events = progress.events();
    assert_eq!(events[0].message, "استخراج النص من المستند...");
    assert_eq!(events[4].message, "اكتمل التحليل!");
}

/// The controller reads the file, runs the pipeline and writes JSON
#[test]
fn test_controller_runAnalyze_shouldWriteJsonResult() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        dir.path(),
        "lease.pdf",
        &common::text_pdf(&["The lessee shall pay the rent monthly to the lessor"]),
    )
    .unwrap();
    let output = dir.path().join("out/lease.json");

    let mut config = Config::default();
    config.extraction.ocr_enabled = false;
    let controller = Controller::with_provider(config, Arc::new(MockProvider::working()));

    let result = tokio_test::block_on(controller.run_analyze(&input, Some(&output))).unwrap();

    let written: PipelineResult = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written, result);
    assert!(written.raw_text.contains("lessee"));
}
