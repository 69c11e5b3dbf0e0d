/*!
 * Tests for document reading and writing
 */

use anyhow::Result;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use docxlate::document::{
    DocumentReader, DocumentWriter, OutputDocument, Paragraph, Run, Table, TableCell, TableRow,
};
use docxlate::errors::{OpenError, WriteError};
use crate::common::{self, paragraph_xml, DocxBuilder};

fn texts(paragraphs: &[Paragraph]) -> Vec<String> {
    paragraphs.iter().map(|p| p.text()).collect()
}

#[test]
fn test_open_withBodyTableAndSdt_shouldFlattenInReadingOrder() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let table = format!(
        "<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
        paragraph_xml(None, false, &[("cell one", false)]),
        paragraph_xml(None, false, &[("cell two", false)])
    );
    let nested_sdt = format!(
        "<w:sdt><w:sdtContent>{}</w:sdtContent></w:sdt>",
        paragraph_xml(None, false, &[("nested", false)])
    );

    let path = DocxBuilder::new()
        .text("first")
        .sdt(&[paragraph_xml(None, false, &[("block a", false)]), nested_sdt])
        .raw(&table)
        .text("second")
        .sdt(&[paragraph_xml(None, false, &[("block b", false)])])
        .write(&dir.path().join("order.docx"))?;

    let source = DocumentReader::open(&path)?;
    assert_eq!(
        texts(&source.paragraphs),
        vec!["first", "second", "cell one", "cell two", "block a", "nested", "block b"]
    );
    Ok(())
}

#[test]
fn test_open_withMissingFile_shouldReturnNotFound() {
    let result = DocumentReader::open("no/such/file.docx");
    assert!(matches!(result, Err(OpenError::NotFound(_))));
}

#[test]
fn test_open_withPlainTextFile_shouldReturnInvalidArchive() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("notes.docx");
    std::fs::write(&path, "just some text")?;

    assert!(matches!(DocumentReader::open(&path), Err(OpenError::InvalidArchive(_))));
    Ok(())
}

#[test]
fn test_fromReader_withoutDocumentPart_shouldReturnMissingPart() -> Result<()> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("docProps/app.xml", SimpleFileOptions::default())?;
    zip.write_all(b"<Properties/>")?;
    let cursor = zip.finish()?;

    let result = DocumentReader::from_reader(Cursor::new(cursor.into_inner()));
    assert!(matches!(result, Err(OpenError::MissingPart(_))));
    Ok(())
}

#[test]
fn test_open_withStylesPart_shouldCarryStylesThrough() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let styles = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
    let path = DocxBuilder::new()
        .text("styled")
        .with_styles(styles)
        .write(&dir.path().join("styles.docx"))?;

    let source = DocumentReader::open(&path)?;
    assert_eq!(source.styles.as_deref(), Some(styles));
    Ok(())
}

#[test]
fn test_save_withExistingDestination_shouldOverwrite() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let destination = dir.path().join("document-output.docx");
    std::fs::write(&destination, "stale")?;

    let document = OutputDocument {
        table: Table {
            rows: vec![TableRow {
                cells: vec![
                    TableCell::with_paragraph(Paragraph::new().add_run(Run::new("Hola", false))),
                    TableCell::with_paragraph(Paragraph::new().add_run(Run::new("Hello", false))),
                ],
            }],
            ..Table::default()
        },
        styles_xml: None,
    };
    DocumentWriter::save(&document, &destination)?;

    let rows = common::read_rows(&destination)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0.text(), "Hola");
    assert_eq!(rows[0].1.text(), "Hello");
    Ok(())
}

#[test]
fn test_save_intoMissingDirectory_shouldFailAndLeaveNothing() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let destination = dir.path().join("missing").join("out.docx");

    let result = DocumentWriter::save(&OutputDocument::default(), &destination);
    assert!(matches!(result, Err(WriteError::Create { .. })));
    assert!(!destination.exists());
    Ok(())
}
