/*!
 * Tests for application configuration functionality
 */

use lexdoc::app_config::{Config, InterfaceLanguage, LogLevel};
use lexdoc::language_utils::{Language, LanguagePair};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.interface_language, InterfaceLanguage::Arabic);
    assert_eq!(config.max_document_bytes, 20 * 1024 * 1024);
    assert_eq!(config.provider.endpoint, "http://localhost:11434");

    assert_eq!(config.summarization.chunk_size, 500);
    assert_eq!(config.summarization.min_length, 30);
    assert_eq!(config.summarization.max_length, 130);
    assert_eq!(config.summarization.batch_size, 2);
    assert_eq!(config.summarization.extractive.top_n, 3);

    assert_eq!(config.translation.chunk_size, 450);
    assert_eq!(config.translation.max_input_tokens, 512);
    assert_eq!(config.translation.num_beams, 2);
    assert!((config.translation.length_penalty - 0.6).abs() < f32::EPSILON);

    assert!(config.validate().is_ok());
}

/// Partial JSON must be filled in with field defaults
#[test]
fn test_from_file_withPartialJson_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        br#"{ "interface_language": "english", "translation": { "pair_models": { "en-ar": "opus-en-ar" } } }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.interface_language, InterfaceLanguage::English);
    assert_eq!(config.summarization, Config::default().summarization);

    let en_ar = LanguagePair::new(Language::English, Language::Arabic);
    let ar_en = LanguagePair::new(Language::Arabic, Language::English);
    assert_eq!(config.translation.model_for(&en_ar), "opus-en-ar");
    assert_eq!(config.translation.model_for(&ar_en), config.translation.default_model);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.summarization.min_length = 200;
    assert!(config.validate().is_err());
    config.summarization.min_length = 30;

    config.provider.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.provider.endpoint = "http://10.0.0.2:11434".to_string();

    config.translation.pair_models.insert("en-fr".to_string(), "m".to_string());
    assert!(config.validate().is_err());
    config.translation.pair_models.clear();

    config.extraction.dpi = 10;
    assert!(config.validate().is_err());
    config.extraction.dpi = 300;

    assert!(config.validate().is_ok());
}

/// Saved configuration must load back unchanged
#[test]
fn test_save_thenLoad_shouldPreserveValues() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.agent.model = "legal-model".to_string();
    config.extraction.ocr_enabled = false;
    config.save(&path).unwrap();

    assert_eq!(Config::from_file(&path).unwrap(), config);
}

#[test]
fn test_interfaceLanguage_fromStr_shouldAcceptCodes() {
    assert_eq!("ar".parse::<InterfaceLanguage>().unwrap(), InterfaceLanguage::Arabic);
    assert_eq!("English".parse::<InterfaceLanguage>().unwrap(), InterfaceLanguage::English);
    assert!("fr".parse::<InterfaceLanguage>().is_err());
}
