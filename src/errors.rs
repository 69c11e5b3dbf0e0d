/*!
 * Error types for the docxlate application.
 *
 * This module contains custom error types for each pipeline stage,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when opening a source document
#[derive(Error, Debug)]
pub enum OpenError {
    /// The document path does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The document could not be read from disk
    #[error("Failed to read document: {0}")]
    Io(String),

    /// The file is not a zip package
    #[error("Not a valid document archive: {0}")]
    InvalidArchive(String),

    /// A required package part is absent
    #[error("Document is missing part: {0}")]
    MissingPart(String),

    /// The document XML could not be parsed
    #[error("Malformed document XML: {0}")]
    Xml(String),
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider broke the one-translation-per-input contract
    #[error("Expected {expected} translations but received {actual}")]
    CountMismatch {
        /// Number of strings submitted
        expected: usize,
        /// Number of strings returned
        actual: usize,
    },

    /// The call did not finish within the configured bound
    #[error("Translation request timed out after {secs}s")]
    Timeout {
        /// Configured bound in seconds
        secs: u64,
    },

    /// The run was cancelled while a call was in flight
    #[error("Translation cancelled")]
    Cancelled,
}

impl TranslationError {
    /// Build a timeout error from the configured duration
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { secs: duration.as_secs() }
    }
}

/// Errors that can occur when saving the output document
#[derive(Error, Debug)]
pub enum WriteError {
    /// The destination could not be created
    #[error("Failed to create {path}: {reason}")]
    Create {
        /// Destination path
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// Writing the package failed part way
    #[error("I/O error: {0}")]
    Io(String),

    /// The zip container could not be produced
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad input path or format
    #[error("Error opening document: {0}")]
    Open(#[from] OpenError),

    /// Target language code is not valid
    #[error("Failed to parse target language: {0}")]
    LanguageConfig(String),

    /// The translation client could not be constructed
    #[error("Failed to create client: {0}")]
    ClientInit(String),

    /// Error from translation
    #[error("Failed to translate text: {0}")]
    Translation(#[from] TranslationError),

    /// The output document could not be written
    #[error("Failed to save document: {0}")]
    Write(#[from] WriteError),

    /// The configuration file could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        Self::Translation(TranslationError::Provider(error))
    }
}
