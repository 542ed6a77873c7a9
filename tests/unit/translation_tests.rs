/*!
 * Tests for the translator and its model cache
 */

use std::sync::Arc;

use lexdoc::app_config::TranslationConfig;
use lexdoc::errors::TranslationError;
use lexdoc::language_utils::Language;
use lexdoc::providers::mock::MockProvider;
use lexdoc::translation::Translator;

fn translator(provider: &Arc<MockProvider>) -> Translator {
    Translator::new(provider.clone(), TranslationConfig::default())
}

#[tokio::test]
async fn test_translateNamed_withUnsupportedLanguage_shouldFail() {
    let provider = Arc::new(MockProvider::working());
    let translator = translator(&provider);

    let result = translator.translate_named("bonjour", "fr", "en").await;

    assert!(matches!(result, Err(TranslationError::UnsupportedLanguage(ref code)) if code == "fr"));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withUnloadableModel_shouldFailAndRetryLoadNextTime() {
    let config = TranslationConfig::default();
    let provider = Arc::new(MockProvider::working().with_missing_model(config.default_model.clone()));
    let translator = Translator::new(provider.clone(), config);

    for _ in 0..2 {
        let result = translator.translate("hello", Language::English, Language::Urdu).await;
        assert!(matches!(
            result,
            Err(TranslationError::ModelUnavailable { from: Language::English, to: Language::Urdu })
        ));
    }

    assert_eq!(provider.load_count(), 2);
    assert!(translator.cache().is_empty());
}

#[tokio::test]
async fn test_translate_shouldLoadEachPairOnce() {
    let provider = Arc::new(MockProvider::working());
    let translator = translator(&provider);

    translator.translate("first text", Language::English, Language::Arabic).await.unwrap();
    translator.translate("second text", Language::English, Language::Arabic).await.unwrap();
    assert_eq!(provider.load_count(), 1);

    translator.translate("third text", Language::Arabic, Language::English).await.unwrap();
    assert_eq!(provider.load_count(), 2);
    assert_eq!(translator.cache().len(), 2);

    translator.cache().clear();
    translator.translate("fourth text", Language::English, Language::Arabic).await.unwrap();
    assert_eq!(provider.load_count(), 3);
}

#[tokio::test]
async fn test_translate_withPairOverride_shouldUseOverrideModel() {
    let provider = Arc::new(MockProvider::working());
    let mut config = TranslationConfig::default();
    config.pair_models.insert("en-zh".to_string(), "opus-mt-en-zh".to_string());
    let translator = Translator::new(provider.clone(), config);

    translator.translate("The court ruled.", Language::English, Language::Chinese).await.unwrap();

    let request = &provider.requests()[0];
    assert_eq!(request.model, "opus-mt-en-zh");
    assert_eq!(request.num_beams, Some(2));
    assert_eq!(request.max_tokens, Some(512));
}

#[tokio::test]
async fn test_translate_withNothingLeftAfterPreprocessing_shouldNotGenerate() {
    let provider = Arc::new(MockProvider::working());
    let translator = translator(&provider);

    let translation = translator.translate("@@@ ### $$$", Language::Arabic, Language::English).await.unwrap();

    assert_eq!(translation.text, "");
    assert_eq!(translation.chunks, 0);
    assert!(!translation.degraded);
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withFailingModel_shouldReturnOriginalTextDegraded() {
    let provider = Arc::new(MockProvider::failing());
    let translator = translator(&provider);
    let original = "يلتزم المستأجر بدفع الإيجار.";

    let translation = translator.translate(original, Language::Arabic, Language::English).await.unwrap();

    assert!(translation.degraded);
    assert_eq!(translation.text, original);
    assert_eq!(translation.target, Language::English);
}

#[tokio::test]
async fn test_translate_withEmptyModelOutput_shouldBeDegraded() {
    let provider = Arc::new(MockProvider::empty());
    let translator = translator(&provider);

    let translation = translator.translate("Some text.", Language::English, Language::Hindi).await.unwrap();
    assert!(translation.degraded);
}

#[tokio::test]
async fn test_translate_withLongText_shouldChunkAndReleaseBetweenChunks() {
    let provider = Arc::new(MockProvider::working().with_custom_response(|_| "translated".to_string()));
    let config = TranslationConfig { chunk_size: 40, ..TranslationConfig::default() };
    let translator = Translator::new(provider.clone(), config);
    let text = "First paragraph of the lease.\n\nSecond paragraph of the lease.\n\nThird paragraph here.";

    let translation = translator.translate(text, Language::English, Language::Chinese).await.unwrap();

    assert_eq!(translation.chunks, 3);
    assert_eq!(provider.request_count(), 3);
    assert_eq!(provider.release_count(), 2);
    assert_eq!(translation.text, "translated translated translated");
}

#[tokio::test]
async fn test_translate_shouldTruncateChunksToTokenLimit() {
    let provider = Arc::new(MockProvider::working());
    let config = TranslationConfig { max_input_tokens: 3, ..TranslationConfig::default() };
    let translator = Translator::new(provider.clone(), config);

    translator.translate("one two three four five", Language::English, Language::Arabic).await.unwrap();

    assert_eq!(provider.requests()[0].prompt, "one two three");
}

#[tokio::test]
async fn test_translate_toEnglish_shouldPostProcessOutput() {
    let provider = Arc::new(MockProvider::working().with_custom_response(|_| "the court ruled .costs apply".to_string()));
    let translator = translator(&provider);

    let translation = translator.translate("حكمت المحكمة", Language::Arabic, Language::English).await.unwrap();

    assert_eq!(translation.text, "The court ruled. Costs apply");
    assert!(translator.token_usage().completion_tokens > 0);
}

#[tokio::test]
async fn test_translator_sharedAcrossTasks_shouldUseOneCache() {
    let provider = Arc::new(MockProvider::working());
    let translator = Arc::new(translator(&provider));

    let first = {
        let translator = translator.clone();
        tokio::spawn(async move { translator.translate("one", Language::English, Language::Hindi).await })
    };
    let second = {
        let translator = translator.clone();
        tokio::spawn(async move { translator.translate("two", Language::English, Language::Hindi).await })
    };

    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());
    assert_eq!(translator.cache().len(), 1);
}

#[test]
fn test_detectLanguage_withArabicText_shouldReturnArabic() {
    let provider = Arc::new(MockProvider::working());
    let translator = translator(&provider);

    assert_eq!(
        translator.detect_language("تنص المادة الأولى من العقد على التزامات الطرفين وفقاً للقانون"),
        Language::Arabic
    );
    assert_eq!(translator.supported_languages().len(), 5);
}
