/*!
 * Tests for provider construction and the Provider trait
 */

use std::sync::Arc;

use docxlate::app_config::{TranslationConfig, TranslationProvider};
use docxlate::errors::AppError;
use docxlate::providers::mock::MockProvider;
use docxlate::providers::ollama::Ollama;
use docxlate::providers::{self, Provider};

fn google_config(api_key: &str) -> TranslationConfig {
    let mut config = TranslationConfig::default();
    for provider in config.available_providers.iter_mut() {
        if provider.provider_type == "google" {
            provider.api_key = api_key.to_string();
        }
    }
    config
}

#[test]
fn test_createProvider_withBlankGoogleKey_shouldFailWithClientInit() {
    let result = providers::create_provider(&google_config("   "));
    match result {
        Err(AppError::ClientInit(message)) => assert!(message.contains("API key")),
        other => panic!("expected ClientInit, got {:?}", other.map(|p| p.name().to_string())),
    }
}

#[test]
fn test_createProvider_withOllamaAndEmptyModel_shouldFallBackToDefaultModel() {
    let mut config = TranslationConfig {
        provider: TranslationProvider::Ollama,
        ..TranslationConfig::default()
    };
    for provider in config.available_providers.iter_mut() {
        provider.model.clear();
    }
    let provider = providers::create_provider(&config).unwrap();
    assert_eq!(provider.name(), "ollama");
}

#[test]
fn test_provider_asTraitObject_shouldBeUsableThroughArc() {
    let provider: Arc<dyn Provider> = Arc::new(MockProvider::working());
    let result = tokio_test::block_on(provider.translate(&["Bonjour".to_string()], "en"));
    assert_eq!(tokio_test::assert_ok!(result), vec!["[en] Bonjour"]);

    let failing: Arc<dyn Provider> = Arc::new(MockProvider::failing());
    tokio_test::assert_err!(tokio_test::block_on(failing.translate(&["Bonjour".to_string()], "en")));
}

#[test]
fn test_ollamaPrompt_shouldRoundTripThroughParser() {
    let ollama = Ollama::new("", "llama3").unwrap();
    let texts = vec!["Hola".to_string(), "mundo".to_string()];
    let prompt = Ollama::build_prompt(&texts);
    assert_eq!(ollama.parse_entries(&prompt, 2).unwrap(), texts);
}
