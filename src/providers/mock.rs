/*!
 * Mock provider for testing.
 *
 * The mock never touches the network. It records every batch it receives
 * and can simulate failures, contract violations and slow responses:
 * - `MockProvider::working()` - prefixes each string with the target code
 * - `MockProvider::failing()` - always fails with an API error
 * - `MockBehavior::FailOnCall` - fails on one specific call
 * - `MockBehavior::WrongCount` - drops the last translation of each batch
 * - `MockBehavior::Slow` - waits before answering (for timeout testing)
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Always succeeds with one translation per input
    Working,
    /// Always fails with an error
    Failing,
    /// Fails on the given call (1-based), succeeds otherwise
    FailOnCall { call: usize },
    /// Returns one translation fewer than requested
    WrongCount,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// A batch as received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub texts: Vec<String>,
    pub target_language: String,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of calls received, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every batch received, shared between clones
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Custom translation for a single string (optional)
    custom_response: Option<fn(&str, &str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Set a custom translation function, called as `(text, target_language)`
    pub fn with_custom_response(mut self, generator: fn(&str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every batch received so far, in call order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn translate_one(&self, text: &str, target_language: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(text, target_language),
            None => format!("[{}] {}", target_language, text),
        }
    }

    fn translate_all(&self, texts: &[String], target_language: &str) -> Vec<String> {
        texts.iter().map(|t| self.translate_one(t, target_language)).collect()
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, texts: &[String], target_language: &str) -> Result<Vec<String>, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(RecordedRequest {
            texts: texts.to_vec(),
            target_language: target_language.to_string(),
        });

        match self.behavior {
            MockBehavior::Working => Ok(self.translate_all(texts, target_language)),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::FailOnCall { call: failing } => {
                if call == failing {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated failure (request #{})", call),
                        status_code: 503,
                    })
                } else {
                    Ok(self.translate_all(texts, target_language))
                }
            }

            MockBehavior::WrongCount => {
                let mut translations = self.translate_all(texts, target_language);
                translations.pop();
                Ok(translations)
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.translate_all(texts, target_language))
            }
        }
    }
}
