/*!
 * Text extraction from paragraphs.
 *
 * Runs with empty text are skipped. A paragraph whose remaining runs carry
 * no visible text (spacing paragraphs) is dropped entirely and produces no
 * output row.
 */

use crate::document::{Paragraph, Run};
use crate::errors::TranslationError;

use super::{TranslatedParagraph, TranslatedRun};

/// A paragraph together with the runs that will be submitted for translation
#[derive(Debug, Clone)]
pub struct ExtractedParagraph<'a> {
    /// Source paragraph
    pub paragraph: &'a Paragraph,

    /// Non-empty runs, in source order
    pub runs: Vec<&'a Run>,
}

impl<'a> ExtractedParagraph<'a> {
    /// Texts to submit, one per kept run
    pub fn texts(&self) -> Vec<String> {
        self.runs.iter().map(|run| run.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Pair each kept run with its translation.
    ///
    /// Translations must be in the same order as `texts()` and exactly as
    /// many; anything else is a contract violation by the provider.
    pub fn pair(self, translations: Vec<String>) -> Result<TranslatedParagraph, TranslationError> {
        if translations.len() != self.runs.len() {
            return Err(TranslationError::CountMismatch {
                expected: self.runs.len(),
                actual: translations.len(),
            });
        }

        let runs = self
            .runs
            .iter()
            .zip(translations)
            .map(|(run, translated)| TranslatedRun {
                original: run.text.clone(),
                translated,
                bold: run.properties.bold,
            })
            .collect();

        Ok(TranslatedParagraph {
            style: self.paragraph.style.clone(),
            bold: self.paragraph.properties.bold,
            runs,
        })
    }
}

/// Ordered list of non-empty run texts of a paragraph
pub fn extract_texts(paragraph: &Paragraph) -> Vec<String> {
    paragraph
        .runs
        .iter()
        .filter(|run| !run.is_empty())
        .map(|run| run.text.clone())
        .collect()
}

/// Select the runs to translate, or `None` when the paragraph has no text
pub fn extract(paragraph: &Paragraph) -> Option<ExtractedParagraph<'_>> {
    let runs: Vec<&Run> = paragraph.runs.iter().filter(|run| !run.is_empty()).collect();

    if runs.iter().all(|run| run.text.trim().is_empty()) {
        return None;
    }

    Some(ExtractedParagraph { paragraph, runs })
}

/// Extract every paragraph that has text, preserving order
pub fn extract_all(paragraphs: &[Paragraph]) -> Vec<ExtractedParagraph<'_>> {
    paragraphs.iter().filter_map(extract).collect()
}
