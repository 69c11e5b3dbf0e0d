use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::Provider;

/// Default address of a local Ollama server
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

const END_MARKER: &str = "<<END>>";

/// Ollama client translating batches through a local LLM
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model name to use for generation
    model: String,
    /// HTTP client for making requests
    client: Client,
    /// Matches `<<ENTRY_n>>` markers in model output
    marker: Regex,
}

impl std::fmt::Debug for Ollama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ollama")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new client, falling back to the local default address when
    /// `endpoint` is empty
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, ProviderError> {
        let endpoint = endpoint.into();
        let base_url = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        let client = Client::builder()
            // Ollama uses HTTP/1.1
            .http1_only()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        let marker = Regex::new(r"<<ENTRY_(\d+)>>")
            .map_err(|e| ProviderError::ParseError(format!("Invalid entry marker pattern: {}", e)))?;

        Ok(Self {
            base_url,
            model: model.into(),
            client,
            marker,
        })
    }

    /// Render a batch as numbered entries terminated by an end marker
    pub fn build_prompt(texts: &[String]) -> String {
        let mut prompt = String::new();
        for (idx, text) in texts.iter().enumerate() {
            prompt.push_str(&format!("<<ENTRY_{}>>\n", idx));
            prompt.push_str(text);
            prompt.push('\n');
        }
        prompt.push_str(END_MARKER);
        prompt
    }

    /// System message for a target language
    pub fn system_prompt(target_language: &str) -> String {
        let primary = target_language.split(['-', '_']).next().unwrap_or(target_language);
        let language = language_utils::get_language_name(primary).unwrap_or_else(|_| target_language.to_string());

        format!(
            "You are a professional translator. Translate every entry into {}. \
             Each entry starts with a marker of the form <<ENTRY_N>>. Keep every marker \
             exactly as it is, translate each entry separately, never merge entries, \
             and finish with {}. Output only the markers and the translations.",
            language, END_MARKER
        )
    }

    /// Split model output back into `expected` entries, in marker order
    pub fn parse_entries(&self, output: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
        let output = match output.find(END_MARKER) {
            Some(end) => &output[..end],
            None => {
                warn!("Ollama response has no end marker, using the whole output");
                output
            }
        };

        let markers: Vec<(usize, usize, usize)> = self
            .marker
            .captures_iter(output)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let idx = caps.get(1)?.as_str().parse::<usize>().ok()?;
                Some((idx, whole.start(), whole.end()))
            })
            .collect();

        let mut entries: HashMap<usize, String> = HashMap::new();
        for (pos, (idx, _, content_start)) in markers.iter().enumerate() {
            let content_end = markers.get(pos + 1).map(|m| m.1).unwrap_or(output.len());
            let text = &output[*content_start..content_end];
            let text = text.strip_prefix('\n').unwrap_or(text);
            let text = text.strip_suffix('\n').unwrap_or(text);
            entries.entry(*idx).or_insert_with(|| text.to_string());
        }

        (0..expected)
            .map(|idx| {
                entries
                    .remove(&idx)
                    .ok_or_else(|| ProviderError::ParseError(format!("Could not find marker for entry {}", idx)))
            })
            .collect()
    }

    /// Generate text from the Ollama API
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to send request to Ollama API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            debug!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        response
            .json::<GenerationResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama API response: {}", e)))
    }
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn translate(&self, texts: &[String], target_language: &str) -> Result<Vec<String>, ProviderError> {
        let request = GenerationRequest::new(&self.model, Self::build_prompt(texts))
            .system(Self::system_prompt(target_language))
            .temperature(0.2);

        let response = self.generate(request).await?;
        debug!("Ollama model {} answered {} chars", response.model, response.response.len());

        self.parse_entries(&response.response, texts.len())
    }
}
