/*!
 * Word-processing document handling.
 *
 * - `model`: paragraph, run and table types shared by input and output
 * - `reader`: opens a `.docx` package and flattens its paragraphs
 * - `assembler`: builds the two-column bilingual table
 * - `writer`: serializes the output document to a `.docx` package
 */

pub mod assembler;
pub mod model;
pub mod reader;
pub mod writer;

pub use assembler::{AssemblyStats, DocumentAssembler};
pub use model::{
    OutputDocument, Paragraph, ParagraphProperties, Run, RunProperties, Table, TableBorders,
    TableCell, TableRow,
};
pub use reader::{DocumentReader, SourceDocument};
pub use writer::DocumentWriter;

/// WordprocessingML main namespace
pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Package part holding the main document body
pub const DOCUMENT_PART: &str = "word/document.xml";
