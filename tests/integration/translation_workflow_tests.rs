/*!
 * End-to-end tests of document translation
 */

use std::sync::Arc;

use lexdoc::errors::{PipelineError, TranslationError};
use lexdoc::language_utils::Language;
use lexdoc::providers::mock::MockProvider;

use crate::common::{self, CannedAgent, FixedTextLayer, ProgressLog};

#[tokio::test]
async fn test_translateDocument_withArabicPdf_shouldTranslateToEnglish() {
    common::init_logging();
    let provider = Arc::new(MockProvider::working().with_custom_response(|_| "the lease is valid .rent is due".to_string()));
    let pipeline = common::build_pipeline(
        provider.clone(),
        Arc::new(FixedTextLayer(common::arabic_contract_pages())),
        None,
        CannedAgent::default(),
    );
    let progress = ProgressLog::default();

    let outcome = pipeline.translate_document(b"%PDF", Language::English, &progress.sink()).await.unwrap();

    assert_eq!(outcome.source_language, Language::Arabic);
    assert!(!outcome.translation.degraded);
    assert!(outcome.translation.text.starts_with("The lease is valid. Rent is due"));
    assert_eq!(progress.fractions(), vec![0.1, 0.4, 0.6, 1.0]);
    assert_eq!(pipeline.translator().cache().len(), 1);
}

#[tokio::test]
async fn test_translateDocument_withSameLanguage_shouldFailBeforeGeneration() {
    let provider = Arc::new(MockProvider::working());
    let pipeline = common::build_pipeline(
        provider.clone(),
        Arc::new(FixedTextLayer(common::arabic_contract_pages())),
        None,
        CannedAgent::default(),
    );
    let progress = ProgressLog::default();

    let result = pipeline.translate_document(b"%PDF", Language::Arabic, &progress.sink()).await;

    assert!(matches!(result, Err(PipelineError::SameLanguage(Language::Arabic))));
    assert_eq!(provider.request_count(), 0);
    assert_eq!(provider.load_count(), 0);
    assert_eq!(progress.fractions().last(), Some(&0.0));
}

#[tokio::test]
async fn test_translateDocument_withUnavailableModel_shouldSurfaceTranslationError() {
    let provider = Arc::new(MockProvider::working().with_missing_model("aya-expanse:8b"));
    let pipeline = common::build_pipeline(
        provider,
        Arc::new(FixedTextLayer(common::arabic_contract_pages())),
        None,
        CannedAgent::default(),
    );

    let result = pipeline.translate_document(b"%PDF", Language::Hindi, &lexdoc::pipeline::no_progress).await;

    assert!(matches!(
        result,
        Err(PipelineError::Translation(TranslationError::ModelUnavailable { from: Language::Arabic, to: Language::Hindi }))
    ));
}

#[tokio::test]
async fn test_translateDocument_withSymbolsOnly_shouldNotGenerate() {
    let provider = Arc::new(MockProvider::working());
    let pipeline = common::build_pipeline(
        provider.clone(),
        Arc::new(FixedTextLayer(vec!["@@@ ### *** %%%".to_string()])),
        None,
        CannedAgent::default(),
    );

    let outcome = pipeline.translate_document(b"%PDF", Language::Arabic, &lexdoc::pipeline::no_progress).await.unwrap();

    assert_eq!(outcome.source_language, Language::English);
    assert!(outcome.translation.text.is_empty());
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translateDocument_withOversizedDocument_shouldFailWithoutExtraction() {
    let pipeline = common::build_pipeline(
        Arc::new(MockProvider::working()),
        Arc::new(FixedTextLayer(common::arabic_contract_pages())),
        None,
        CannedAgent::default(),
    )
    .max_document_bytes(2);

    let result = pipeline.translate_document(b"%PDF", Language::English, &lexdoc::pipeline::no_progress).await;

    assert!(matches!(result, Err(PipelineError::DocumentTooLarge { size: 4, limit: 2 })));
}
