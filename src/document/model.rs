/*!
 * Core document model types.
 *
 * Input paragraphs and the assembled output table share the same
 * paragraph/run representation; only the formatting the pipeline consults
 * (style and bold) is kept.
 */

/// Run-level formatting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunProperties {
    /// Whether the run is bold
    pub bold: bool,
}

impl RunProperties {
    pub fn bold(bold: bool) -> Self {
        Self { bold }
    }
}

/// Paragraph-level formatting (paragraph mark run properties)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParagraphProperties {
    /// Whether the paragraph mark is bold
    pub bold: bool,
}

/// The smallest styled unit of text within a paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    /// Text content, possibly empty
    pub text: String,

    /// Formatting of this run
    pub properties: RunProperties,
}

impl Run {
    /// Create a run with the given text and bold flag
    pub fn new(text: impl Into<String>, bold: bool) -> Self {
        Self {
            text: text.into(),
            properties: RunProperties::bold(bold),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A block of document content composed of runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Style identifier, empty when the paragraph has no explicit style
    pub style: String,

    /// Paragraph-level formatting
    pub properties: ParagraphProperties,

    /// Runs in document order
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create an unstyled paragraph
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the style identifier
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Set the paragraph-level bold flag
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.properties.bold = bold;
        self
    }

    /// Append a run
    pub fn add_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Table border rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableBorders {
    /// No visible borders on any edge
    #[default]
    None,
    /// Single thin line on every edge
    Single,
}

/// A table cell holding paragraphs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

impl TableCell {
    /// Create a cell with a single paragraph
    pub fn with_paragraph(paragraph: Paragraph) -> Self {
        Self {
            paragraphs: vec![paragraph],
        }
    }
}

/// A table row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// A table in the output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Width as a percentage of the page text width
    pub width_pct: u32,

    /// Border rendering
    pub borders: TableBorders,

    /// Rows in order
    pub rows: Vec<TableRow>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            width_pct: 100,
            borders: TableBorders::None,
            rows: Vec::new(),
        }
    }
}

impl Table {
    /// Number of columns of the widest row
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }
}

/// The generated side-by-side document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDocument {
    /// The single bilingual table
    pub table: Table,

    /// Style definitions carried over from the source package
    pub styles_xml: Option<String>,
}

impl OutputDocument {
    /// Every distinct paragraph style referenced by the table, in first-use order
    pub fn referenced_styles(&self) -> Vec<&str> {
        let mut styles: Vec<&str> = Vec::new();
        let referenced = self
            .table
            .rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .flat_map(|cell| cell.paragraphs.iter())
            .map(|p| p.style.as_str())
            .filter(|s| !s.is_empty());

        for style in referenced {
            if !styles.contains(&style) {
                styles.push(style);
            }
        }
        styles
    }
}
