/*!
 * # docxlate - bilingual document translation
 *
 * A Rust library that reads a word-processing document (`.docx`),
 * translates every paragraph through a translation service and writes a
 * new document showing original and translation side by side.
 *
 * ## Pipeline
 *
 * open → flatten paragraphs → batch-translate → two-column table → save
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: `.docx` reading, table assembly and writing:
 *   - `document::reader`: paragraph flattening from the source package
 *   - `document::assembler`: bilingual table construction
 *   - `document::writer`: deterministic package output
 * - `translation`: run extraction and the translation step
 * - `providers`: Client implementations for the translation back ends:
 *   - `providers::google`: Google Cloud Translation v2
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: in-process provider for tests
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{BatchingPolicy, Config};
pub use app_controller::{Controller, RunSummary};
pub use document::{DocumentReader, DocumentWriter};
pub use errors::{AppError, OpenError, ProviderError, TranslationError, WriteError};
pub use language_utils::TargetLanguage;
pub use providers::Provider;
pub use translation::TranslationService;
