/*!
 * Translation step of the pipeline.
 *
 * The service submits extracted run texts to a provider and pairs each
 * original with its translation. Every provider call is bounded by the
 * configured timeout and aborted as soon as the cancellation token fires.
 */

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::app_config::BatchingPolicy;
use crate::errors::TranslationError;
use crate::language_utils::TargetLanguage;
use crate::providers::Provider;

use super::{ExtractedParagraph, TranslatedParagraph};

/// Options controlling how the service talks to the provider
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Language every text is translated into
    pub target_language: TargetLanguage,

    /// How paragraphs are grouped into provider calls
    pub batching: BatchingPolicy,

    /// Upper bound on strings per provider call
    pub max_segments_per_request: usize,

    /// Per-call bound, `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

/// Drives a provider over extracted paragraphs
#[derive(Debug, Clone)]
pub struct TranslationService {
    provider: Arc<dyn Provider>,
    options: TranslationOptions,
}

impl TranslationService {
    pub fn new(provider: Arc<dyn Provider>, options: TranslationOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    /// Translate a batch of strings, returning exactly one translation per
    /// input in the same order.
    ///
    /// Batches larger than `max_segments_per_request` are split into
    /// sequential calls.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, TranslationError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = self.options.max_segments_per_request.max(1);
        let mut translations = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(chunk_size) {
            let translated = self.call_provider(chunk, cancel).await?;
            if translated.len() != chunk.len() {
                return Err(TranslationError::CountMismatch {
                    expected: chunk.len(),
                    actual: translated.len(),
                });
            }
            translations.extend(translated);
        }

        Ok(translations)
    }

    /// Translate every extracted paragraph, in order.
    ///
    /// `progress` is called with `(done, total)` after each paragraph is
    /// paired. The first failure aborts the remaining paragraphs.
    pub async fn translate_paragraphs<F>(
        &self,
        paragraphs: Vec<ExtractedParagraph<'_>>,
        cancel: &CancellationToken,
        progress: F,
    ) -> Result<Vec<TranslatedParagraph>, TranslationError>
    where
        F: Fn(usize, usize),
    {
        let total = paragraphs.len();
        let mut translated = Vec::with_capacity(total);

        match self.options.batching {
            BatchingPolicy::Paragraph => {
                for paragraph in paragraphs {
                    let texts = paragraph.texts();
                    let translations = self.translate_batch(&texts, cancel).await?;
                    translated.push(paragraph.pair(translations)?);
                    progress(translated.len(), total);
                }
            }
            BatchingPolicy::Document => {
                let texts: Vec<String> = paragraphs.iter().flat_map(|p| p.texts()).collect();
                debug!("Coalesced {} paragraphs into {} segments", total, texts.len());

                let mut translations = self.translate_batch(&texts, cancel).await?.into_iter();
                for paragraph in paragraphs {
                    let own: Vec<String> = translations.by_ref().take(paragraph.len()).collect();
                    translated.push(paragraph.pair(own)?);
                    progress(translated.len(), total);
                }
            }
        }

        Ok(translated)
    }

    async fn call_provider(
        &self,
        texts: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, TranslationError> {
        let target = self.options.target_language.code();
        debug!(
            "Sending {} segments to {} (target {})",
            texts.len(),
            self.provider.name(),
            target
        );

        let request = self.provider.translate(texts, target);

        let outcome = match self.options.request_timeout {
            Some(limit) => tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TranslationError::Cancelled),
                result = tokio::time::timeout(limit, request) => {
                    result.map_err(|_| TranslationError::timeout(limit))?
                }
            },
            None => tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TranslationError::Cancelled),
                result = request => result,
            },
        };

        Ok(outcome?)
    }
}
