use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Public endpoint of the Cloud Translation API
pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com";

const TRANSLATE_PATH: &str = "language/translate/v2";

/// Google Cloud Translation (v2) client
pub struct Google {
    /// HTTP client for API requests
    client: Client,
    /// API key sent as the `key` query parameter
    api_key: String,
    /// Base URL of the API
    endpoint: String,
    /// Optional translation model (`base` or `nmt`)
    model: Option<String>,
}

impl std::fmt::Debug for Google {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Google")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Translate request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    /// Strings to translate
    q: &'a [String],

    /// Target language code
    target: &'a str,

    /// `text` so that markup characters come back unescaped
    format: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// Translate response body
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub data: TranslationsData,
}

#[derive(Debug, Deserialize)]
pub struct TranslationsData {
    pub translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Text in the target language
    pub translated_text: String,

    /// Source language when it was auto-detected
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl Google {
    /// Create a new client, falling back to the public endpoint when
    /// `endpoint` is empty
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self, ProviderError> {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint
        };

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint,
            model: None,
        })
    }

    /// Select a translation model; empty means the service default
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = if model.trim().is_empty() { None } else { Some(model) };
        self
    }

    /// Full request URL including the API key
    pub fn request_url(&self) -> Result<Url, ProviderError> {
        let mut base = self.endpoint.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        let mut url = Url::parse(&base)
            .and_then(|u| u.join(TRANSLATE_PATH))
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", self.endpoint, e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Map a non-success response to a provider error
    pub fn error_from_status(status: StatusCode, body: &str) -> ProviderError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            },
        }
    }

    /// Extract translations from a success body
    pub fn parse_response(body: &str) -> Result<Vec<String>, ProviderError> {
        let response: TranslateResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::ParseError(format!("Unexpected Google response: {}", e)))?;

        Ok(response
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

#[async_trait]
impl Provider for Google {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(&self, texts: &[String], target_language: &str) -> Result<Vec<String>, ProviderError> {
        let url = self.request_url()?;
        let request = TranslateRequest {
            q: texts,
            target: target_language,
            format: "text",
            model: self.model.as_deref(),
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the API key
                let e = e.without_url();
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body: {}", e.without_url())))?;

        if !status.is_success() {
            debug!("Google API error ({}): {}", status, body);
            return Err(Self::error_from_status(status, &body));
        }

        let translations = Self::parse_response(&body)?;
        debug!("Google returned {} translations", translations.len());
        Ok(translations)
    }
}
