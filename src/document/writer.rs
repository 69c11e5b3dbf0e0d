/*!
 * Serializing the output document to a `.docx` package.
 *
 * The package is written with fixed timestamps and a stable part order so
 * identical documents always produce identical bytes. It is staged in a
 * temporary file next to the destination and renamed into place, so a
 * failed save never leaves a partial file behind.
 */

use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::OpenOptions;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::model::{OutputDocument, Paragraph, Run, Table, TableBorders};
use super::{DOCUMENT_PART, WML_NS};
use crate::errors::WriteError;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const STYLES_PART: &str = "word/styles.xml";

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const STYLES_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

// US Letter with one inch margins, in twentieths of a point
const PAGE_WIDTH: u32 = 12240;
const PAGE_HEIGHT: u32 = 15840;
const PAGE_MARGIN: u32 = 1440;

const BORDER_EDGES: &[&str] = &["top", "left", "bottom", "right", "insideH", "insideV"];

/// Thin wrapper over the quick-xml writer with WordprocessingML helpers
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Result<Self, WriteError> {
        let mut out = Self {
            writer: Writer::new(Vec::new()),
        };
        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(out)
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), WriteError> {
        self.writer
            .write_event(event)
            .map_err(|e| WriteError::Io(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), WriteError> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(start))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), WriteError> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(start))
    }

    fn end(&mut self, name: &str) -> Result<(), WriteError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<(), WriteError> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Characters allowed in XML 1.0 content; anything else cannot round trip
fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn write_run(out: &mut XmlOut, run: &Run) -> Result<(), WriteError> {
    out.start("w:r", &[])?;
    if run.properties.bold {
        out.start("w:rPr", &[])?;
        out.empty("w:b", &[])?;
        out.end("w:rPr")?;
    }

    // Tabs and line breaks are elements of their own, mirroring the reader
    let mut segment = String::new();
    let flush = |out: &mut XmlOut, segment: &mut String| -> Result<(), WriteError> {
        if !segment.is_empty() {
            out.start("w:t", &[("xml:space", "preserve")])?;
            out.text(segment)?;
            out.end("w:t")?;
            segment.clear();
        }
        Ok(())
    };
    let mut chars = run.text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\t' => {
                flush(out, &mut segment)?;
                out.empty("w:tab", &[])?;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                flush(out, &mut segment)?;
                out.empty("w:br", &[])?;
            }
            ch if is_xml_char(ch) => segment.push(ch),
            _ => {}
        }
    }
    flush(out, &mut segment)?;

    out.end("w:r")
}

fn write_paragraph(out: &mut XmlOut, paragraph: &Paragraph) -> Result<(), WriteError> {
    out.start("w:p", &[])?;
    if !paragraph.style.is_empty() || paragraph.properties.bold {
        out.start("w:pPr", &[])?;
        if !paragraph.style.is_empty() {
            out.empty("w:pStyle", &[("w:val", paragraph.style.as_str())])?;
        }
        if paragraph.properties.bold {
            out.start("w:rPr", &[])?;
            out.empty("w:b", &[])?;
            out.end("w:rPr")?;
        }
        out.end("w:pPr")?;
    }
    for run in &paragraph.runs {
        write_run(out, run)?;
    }
    out.end("w:p")
}

fn write_table(out: &mut XmlOut, table: &Table) -> Result<(), WriteError> {
    let columns = table.column_count().max(1) as u32;
    // Percentages are expressed in fiftieths of a percent
    let table_width = (table.width_pct * 50).to_string();
    let cell_width = (table.width_pct * 50 / columns).to_string();
    let grid_width = ((PAGE_WIDTH - 2 * PAGE_MARGIN) * table.width_pct / 100 / columns).to_string();

    out.start("w:tbl", &[])?;
    out.start("w:tblPr", &[])?;
    out.empty("w:tblW", &[("w:w", table_width.as_str()), ("w:type", "pct")])?;
    out.start("w:tblBorders", &[])?;
    let (val, size) = match table.borders {
        TableBorders::None => ("none", "0"),
        TableBorders::Single => ("single", "4"),
    };
    for edge in BORDER_EDGES {
        out.empty(
            &format!("w:{}", edge),
            &[("w:val", val), ("w:sz", size), ("w:space", "0"), ("w:color", "auto")],
        )?;
    }
    out.end("w:tblBorders")?;
    out.empty("w:tblLayout", &[("w:type", "autofit")])?;
    out.end("w:tblPr")?;

    out.start("w:tblGrid", &[])?;
    for _ in 0..columns {
        out.empty("w:gridCol", &[("w:w", grid_width.as_str())])?;
    }
    out.end("w:tblGrid")?;

    for row in &table.rows {
        out.start("w:tr", &[])?;
        for cell in &row.cells {
            out.start("w:tc", &[])?;
            out.start("w:tcPr", &[])?;
            out.empty("w:tcW", &[("w:w", cell_width.as_str()), ("w:type", "pct")])?;
            out.end("w:tcPr")?;
            if cell.paragraphs.is_empty() {
                // A cell must end with a paragraph
                out.empty("w:p", &[])?;
            }
            for paragraph in &cell.paragraphs {
                write_paragraph(out, paragraph)?;
            }
            out.end("w:tc")?;
        }
        out.end("w:tr")?;
    }

    out.end("w:tbl")
}

fn document_xml(document: &OutputDocument) -> Result<Vec<u8>, WriteError> {
    let mut out = XmlOut::new()?;
    out.start("w:document", &[("xmlns:w", WML_NS)])?;
    out.start("w:body", &[])?;

    write_table(&mut out, &document.table)?;
    // Word requires the body to end with a paragraph
    out.empty("w:p", &[])?;

    let page_width = PAGE_WIDTH.to_string();
    let page_height = PAGE_HEIGHT.to_string();
    let margin = PAGE_MARGIN.to_string();
    out.start("w:sectPr", &[])?;
    out.empty("w:pgSz", &[("w:w", page_width.as_str()), ("w:h", page_height.as_str())])?;
    out.empty(
        "w:pgMar",
        &[
            ("w:top", margin.as_str()),
            ("w:right", margin.as_str()),
            ("w:bottom", margin.as_str()),
            ("w:left", margin.as_str()),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    out.end("w:sectPr")?;

    out.end("w:body")?;
    out.end("w:document")?;
    Ok(out.into_bytes())
}

/// Minimal style sheet declaring every referenced paragraph style
fn styles_xml(document: &OutputDocument) -> Result<Vec<u8>, WriteError> {
    let mut out = XmlOut::new()?;
    out.start("w:styles", &[("xmlns:w", WML_NS)])?;

    out.start(
        "w:style",
        &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
    )?;
    out.empty("w:name", &[("w:val", "Normal")])?;
    out.end("w:style")?;

    for style in document.referenced_styles() {
        if style == "Normal" {
            continue;
        }
        out.start(
            "w:style",
            &[("w:type", "paragraph"), ("w:customStyle", "1"), ("w:styleId", style)],
        )?;
        out.empty("w:name", &[("w:val", style)])?;
        out.empty("w:basedOn", &[("w:val", "Normal")])?;
        out.end("w:style")?;
    }

    out.end("w:styles")?;
    Ok(out.into_bytes())
}

fn relationships_xml(target_type: &str, target: &str) -> Result<Vec<u8>, WriteError> {
    let mut out = XmlOut::new()?;
    out.start("Relationships", &[("xmlns", RELS_NS)])?;
    out.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", target_type), ("Target", target)],
    )?;
    out.end("Relationships")?;
    Ok(out.into_bytes())
}

/// Writes output documents as `.docx` packages
pub struct DocumentWriter;

impl DocumentWriter {
    /// Save the document to `destination`, replacing any existing file
    pub fn save<P: AsRef<Path>>(document: &OutputDocument, destination: P) -> Result<(), WriteError> {
        let destination = destination.as_ref();
        let create_error = |reason: String| WriteError::Create {
            path: destination.display().to_string(),
            reason,
        };

        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Opened like File::create so the process umask decides the final mode
        let mut staged = tempfile::Builder::new()
            .prefix(".docxlate")
            .suffix(".tmp")
            .make_in(dir, |path| {
                OpenOptions::new().read(true).write(true).create_new(true).open(path)
            })
            .map_err(|e| create_error(e.to_string()))?;
        {
            let mut buffered = BufWriter::new(staged.as_file_mut());
            Self::write_to(document, &mut buffered)?;
            buffered.flush().map_err(|e| WriteError::Io(e.to_string()))?;
        }
        staged
            .as_file()
            .sync_all()
            .map_err(|e| WriteError::Io(e.to_string()))?;

        staged
            .persist(destination)
            .map_err(|e| create_error(e.error.to_string()))?;

        debug!("Saved document to {}", destination.display());
        Ok(())
    }

    /// Write the package into any seekable sink
    pub fn write_to<W: Write + Seek>(document: &OutputDocument, writer: W) -> Result<W, WriteError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let styles = match &document.styles_xml {
            Some(styles) => styles.as_bytes().to_vec(),
            None => styles_xml(document)?,
        };

        let parts: Vec<(&str, Vec<u8>)> = vec![
            (CONTENT_TYPES_PART, CONTENT_TYPES.as_bytes().to_vec()),
            (PACKAGE_RELS_PART, relationships_xml(OFFICE_DOCUMENT_REL, DOCUMENT_PART)?),
            (DOCUMENT_PART, document_xml(document)?),
            (DOCUMENT_RELS_PART, relationships_xml(STYLES_REL, "styles.xml")?),
            (STYLES_PART, styles),
        ];

        let mut zip = ZipWriter::new(writer);
        for (name, content) in parts {
            zip.start_file(name, options)
                .map_err(|e| WriteError::Archive(e.to_string()))?;
            zip.write_all(&content)
                .map_err(|e| WriteError::Io(e.to_string()))?;
        }
        zip.finish().map_err(|e| WriteError::Archive(e.to_string()))
    }
}
