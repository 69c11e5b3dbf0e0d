/*!
 * Builds the bilingual side-by-side table.
 */

use log::debug;

use super::model::{
    OutputDocument, Paragraph, ParagraphProperties, Run, Table, TableBorders, TableCell, TableRow,
};
use crate::translation::TranslatedParagraph;

/// Counters reported after assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Rows emitted
    pub paragraphs: usize,
    /// Run pairs emitted
    pub runs: usize,
}

/// Turns translated paragraphs into a single two-column table
#[derive(Debug, Default)]
pub struct DocumentAssembler {
    stats: AssemblyStats,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the output document, one row per translated paragraph.
    ///
    /// The left cell keeps the paragraph-level bold of the source, the
    /// right cell only carries run-level bold.
    pub fn assemble(&mut self, paragraphs: &[TranslatedParagraph]) -> OutputDocument {
        let mut table = Table {
            width_pct: 100,
            borders: TableBorders::None,
            rows: Vec::with_capacity(paragraphs.len()),
        };

        for paragraph in paragraphs {
            self.stats.paragraphs += 1;

            let mut original = Paragraph {
                style: paragraph.style.clone(),
                properties: ParagraphProperties::default(),
                runs: Vec::with_capacity(paragraph.runs.len()),
            };
            let mut translated = original.clone();

            for run in &paragraph.runs {
                self.stats.runs += 1;

                original
                    .runs
                    .push(Run::new(run.original.as_str(), run.bold || paragraph.bold));
                translated.runs.push(Run::new(run.translated.as_str(), run.bold));
            }

            table.rows.push(TableRow {
                cells: vec![
                    TableCell::with_paragraph(original),
                    TableCell::with_paragraph(translated),
                ],
            });
        }

        debug!(
            "Assembled table with {} rows ({} runs so far)",
            table.rows.len(),
            self.stats.runs
        );

        OutputDocument {
            table,
            styles_xml: None,
        }
    }

    /// Counters accumulated over every `assemble` call
    pub fn stats(&self) -> AssemblyStats {
        self.stats
    }
}
