/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported back ends:
 * - Google: Cloud Translation v2 REST API
 * - Ollama: Local LLM server
 * - Mock: in-process provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::{AppError, ProviderError};

/// Common trait for all translation providers
///
/// A provider receives a batch of strings and returns one translation per
/// string, in the same order. The translation step checks the count, so
/// implementations report what the service sent back without padding.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Translate a batch of strings into the target language
    ///
    /// # Arguments
    /// * `texts` - Strings to translate
    /// * `target_language` - ISO 639-1 code, optionally with a region subtag
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - The translations or an error
    async fn translate(&self, texts: &[String], target_language: &str) -> Result<Vec<String>, ProviderError>;
}

/// Build the provider selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>, AppError> {
    match config.provider {
        TranslationProvider::Google => {
            let api_key = config.get_api_key();
            if api_key.trim().is_empty() {
                return Err(AppError::ClientInit(
                    "Google provider requires an API key".to_string(),
                ));
            }
            let client = google::Google::new(api_key, config.get_endpoint())
                .map_err(|e| AppError::ClientInit(e.to_string()))?
                .with_model(config.get_model());
            Ok(Arc::new(client))
        }
        TranslationProvider::Ollama => {
            let model = config.get_model();
            if model.trim().is_empty() {
                return Err(AppError::ClientInit(
                    "Ollama provider requires a model".to_string(),
                ));
            }
            let client = ollama::Ollama::new(config.get_endpoint(), model)
                .map_err(|e| AppError::ClientInit(e.to_string()))?;
            Ok(Arc::new(client))
        }
    }
}

pub mod google;
pub mod mock;
pub mod ollama;
