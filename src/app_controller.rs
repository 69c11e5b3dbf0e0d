use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::document::{DocumentAssembler, DocumentReader, DocumentWriter, SourceDocument};
use crate::errors::AppError;
use crate::providers::Provider;
use crate::translation::{self, TranslationOptions, TranslationService};

// @module: Application controller for document translation

/// Stage reached by a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Opened,
    Extracted,
    Translated,
    Assembled,
    Written,
    Done,
    /// Terminal, entered on the first error
    Failed,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Rows written to the output table
    pub paragraphs: usize,
    /// Run pairs written
    pub runs: usize,
    /// Where the document was saved
    pub output_path: PathBuf,
    /// Wall time of the run
    pub elapsed: Duration,
}

struct StateTracker {
    state: PipelineState,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug!("Pipeline state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Draw a progress bar while translating
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            show_progress: true,
        }
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open the source document
    pub fn open<P: AsRef<Path>>(&self, input: P) -> Result<SourceDocument, AppError> {
        let input = input.as_ref();
        info!("Processing {}...", input.display());
        Ok(DocumentReader::open(input)?)
    }

    /// Open, translate, assemble and save in one go
    pub async fn run<P: AsRef<Path>>(
        &self,
        input: P,
        provider: Arc<dyn Provider>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, AppError> {
        let source = self.open(input)?;
        self.process(source, provider, cancel).await
    }

    /// Translate an opened document and write the bilingual output.
    ///
    /// Nothing is written unless every paragraph was translated.
    pub async fn process(
        &self,
        source: SourceDocument,
        provider: Arc<dyn Provider>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, AppError> {
        let mut tracker = StateTracker::new();
        tracker.advance(PipelineState::Opened);

        match self.process_stages(source, provider, cancel, &mut tracker).await {
            Ok(summary) => {
                tracker.advance(PipelineState::Done);
                Ok(summary)
            }
            Err(e) => {
                tracker.advance(PipelineState::Failed);
                Err(e)
            }
        }
    }

    async fn process_stages(
        &self,
        source: SourceDocument,
        provider: Arc<dyn Provider>,
        cancel: &CancellationToken,
        tracker: &mut StateTracker,
    ) -> Result<RunSummary, AppError> {
        let start_time = Instant::now();
        self.config.validate()?;

        let options = TranslationOptions {
            target_language: self.config.target_language()?,
            batching: self.config.translation.batching,
            max_segments_per_request: self.config.translation.max_segments_per_request,
            request_timeout: self.config.translation.get_timeout(),
        };
        debug!(
            "Translating into {} with {} ({:?} batching)",
            options.target_language,
            provider.name(),
            options.batching
        );

        let extracted = translation::extract_all(&source.paragraphs);
        debug!(
            "Extracted {} of {} paragraphs",
            extracted.len(),
            source.paragraphs.len()
        );
        tracker.advance(PipelineState::Extracted);

        let progress_bar = self.progress_bar(extracted.len() as u64);
        let service = TranslationService::new(provider, options);
        let translated = service
            .translate_paragraphs(extracted, cancel, |done, _| progress_bar.set_position(done as u64))
            .await;
        let translated = match translated {
            Ok(translated) => {
                progress_bar.finish_and_clear();
                translated
            }
            Err(e) => {
                progress_bar.abandon();
                return Err(e.into());
            }
        };
        tracker.advance(PipelineState::Translated);

        let mut assembler = DocumentAssembler::new();
        let mut output = assembler.assemble(&translated);
        output.styles_xml = source.styles;
        tracker.advance(PipelineState::Assembled);

        DocumentWriter::save(&output, &self.config.output_path)?;
        tracker.advance(PipelineState::Written);

        let stats = assembler.stats();
        info!("Processed {} paragraphs and {} runs", stats.paragraphs, stats.runs);
        info!(
            "Saved {} in {}",
            self.config.output_path.display(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(RunSummary {
            paragraphs: stats.paragraphs,
            runs: stats.runs,
            output_path: self.config.output_path.clone(),
            elapsed: start_time.elapsed(),
        })
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
