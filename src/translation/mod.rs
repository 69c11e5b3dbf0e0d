/*!
 * Paragraph translation.
 *
 * - `extractor`: picks the runs of a paragraph that get translated
 * - `service`: drives a provider over extracted paragraphs and pairs each
 *   original text with its translation
 */

pub use self::extractor::{ExtractedParagraph, extract, extract_all, extract_texts};
pub use self::service::{TranslationOptions, TranslationService};

pub mod extractor;
pub mod service;

/// One run after translation, original and translated text side by side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedRun {
    /// Source text of the run
    pub original: String,

    /// Provider output for that text
    pub translated: String,

    /// Run-level bold of the source run
    pub bold: bool,
}

/// A source paragraph whose non-empty runs have been translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedParagraph {
    /// Style identifier of the source paragraph
    pub style: String,

    /// Paragraph-level bold of the source paragraph
    pub bold: bool,

    /// Translated runs, in source order
    pub runs: Vec<TranslatedRun>,
}
