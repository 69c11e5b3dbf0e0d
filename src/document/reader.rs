/*!
 * Reading paragraphs out of a `.docx` package.
 *
 * The package is a zip archive; the main document part is located through
 * the package relationships and parsed into a small element tree, which is
 * then walked to produce paragraphs in a fixed order:
 *
 * 1. paragraphs directly in the body
 * 2. paragraphs inside body-level tables
 * 3. paragraphs inside body-level structured content blocks (`w:sdt`),
 *    nested blocks flattened depth first
 */

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

use super::model::{Paragraph, ParagraphProperties, Run, RunProperties};
use super::DOCUMENT_PART;
use crate::errors::OpenError;

const PACKAGE_RELS_PART: &str = "_rels/.rels";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const STYLES_PART_NAME: &str = "styles.xml";

/// Inline containers whose runs belong to the enclosing paragraph
const RUN_CONTAINERS: &[&str] = &[
    "hyperlink",
    "ins",
    "moveTo",
    "smartTag",
    "fldSimple",
    "customXml",
    "dir",
    "bdo",
];

/// Minimal XML element tree, namespace prefixes stripped
#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, OpenError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| OpenError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| OpenError::Xml(e.to_string()))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.name == name)
    }

    fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

fn parse_tree(xml: &str) -> Result<Element, OpenError> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Element::default()];

    loop {
        let event = reader.read_event().map_err(|e| {
            OpenError::Xml(format!("at position {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Element(element));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| OpenError::Xml("unbalanced end tag".to_string()))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| OpenError::Xml("unbalanced end tag".to_string()))?;
                parent.children.push(Node::Element(element));
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| OpenError::Xml(e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(OpenError::Xml("unexpected end of document".to_string()));
    }
    let mut root = stack.pop().unwrap_or_default();
    match root.children.drain(..).find_map(|node| match node {
        Node::Element(el) => Some(el),
        Node::Text(_) => None,
    }) {
        Some(document) => Ok(document),
        None => Err(OpenError::Xml("document has no root element".to_string())),
    }
}

/// `w:b` and friends: present means on unless `w:val` turns it off
fn on_off(element: Option<&Element>) -> bool {
    match element {
        None => false,
        Some(el) => !matches!(el.attr("val"), Some("0") | Some("false") | Some("off")),
    }
}

fn bold_of(rpr: Option<&Element>) -> bool {
    on_off(rpr.and_then(|rpr| rpr.child("b")))
}

fn parse_run(r: &Element) -> Run {
    let mut text = String::new();
    for el in r.elements() {
        match el.name.as_str() {
            "t" => text.push_str(&el.text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }

    Run {
        text,
        properties: RunProperties::bold(bold_of(r.child("rPr"))),
    }
}

fn collect_runs(container: &Element, runs: &mut Vec<Run>) {
    for el in container.elements() {
        match el.name.as_str() {
            "r" => runs.push(parse_run(el)),
            "sdt" => {
                if let Some(content) = el.child("sdtContent") {
                    collect_runs(content, runs);
                }
            }
            name if RUN_CONTAINERS.contains(&name) => collect_runs(el, runs),
            _ => {}
        }
    }
}

fn parse_paragraph(p: &Element) -> Paragraph {
    let ppr = p.child("pPr");
    let style = ppr
        .and_then(|ppr| ppr.child("pStyle"))
        .and_then(|s| s.attr("val"))
        .unwrap_or_default()
        .to_string();
    let bold = bold_of(ppr.and_then(|ppr| ppr.child("rPr")));

    let mut runs = Vec::new();
    collect_runs(p, &mut runs);

    Paragraph {
        style,
        properties: ParagraphProperties { bold },
        runs,
    }
}

fn collect_table(tbl: &Element, out: &mut Vec<Paragraph>) {
    for row in tbl.elements().filter(|el| el.name == "tr") {
        for cell in row.elements() {
            match cell.name.as_str() {
                "tc" => collect_block(cell, out),
                "sdt" => {
                    if let Some(content) = cell.child("sdtContent") {
                        for tc in content.elements().filter(|el| el.name == "tc") {
                            collect_block(tc, out);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Walk a block container (table cell or sdt content) in document order
fn collect_block(container: &Element, out: &mut Vec<Paragraph>) {
    for el in container.elements() {
        match el.name.as_str() {
            "p" => out.push(parse_paragraph(el)),
            "tbl" => collect_table(el, out),
            "sdt" => {
                if let Some(content) = el.child("sdtContent") {
                    collect_block(content, out);
                }
            }
            _ => {}
        }
    }
}

fn flatten_body(body: &Element) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut table_paragraphs = Vec::new();
    let mut block_paragraphs = Vec::new();

    for el in body.elements() {
        match el.name.as_str() {
            "p" => paragraphs.push(parse_paragraph(el)),
            "tbl" => collect_table(el, &mut table_paragraphs),
            "sdt" => {
                if let Some(content) = el.child("sdtContent") {
                    collect_block(content, &mut block_paragraphs);
                }
            }
            _ => {}
        }
    }

    debug!(
        "Flattened {} body, {} table and {} structured block paragraphs",
        paragraphs.len(),
        table_paragraphs.len(),
        block_paragraphs.len()
    );

    paragraphs.extend(table_paragraphs);
    paragraphs.extend(block_paragraphs);
    paragraphs
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, OpenError> {
    let mut part = archive.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => OpenError::MissingPart(name.to_string()),
        other => OpenError::InvalidArchive(other.to_string()),
    })?;
    let mut content = String::new();
    part.read_to_string(&mut content)
        .map_err(|e| OpenError::Io(format!("{}: {}", name, e)))?;
    Ok(content)
}

/// Paragraphs of a source package plus the parts carried into the output
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    /// Flattened paragraphs in reading order
    pub paragraphs: Vec<Paragraph>,

    /// Raw style definitions part, when the package has one
    pub styles: Option<String>,
}

/// Reads `.docx` packages into flattened paragraph lists
pub struct DocumentReader;

impl DocumentReader {
    /// Open a document from disk and return its paragraphs in order
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SourceDocument, OpenError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OpenError::NotFound(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| OpenError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read paragraphs from any seekable source holding a `.docx` package
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<SourceDocument, OpenError> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| OpenError::InvalidArchive(e.to_string()))?;

        let part_name = Self::main_document_part(&mut archive)?;
        debug!("Reading main document part {}", part_name);

        let xml = read_part(&mut archive, &part_name)?;
        let paragraphs = Self::parse_document_xml(&xml)?;

        // Style definitions live next to the main part
        let styles_part = match part_name.rfind('/') {
            Some(idx) => format!("{}/{}", &part_name[..idx], STYLES_PART_NAME),
            None => STYLES_PART_NAME.to_string(),
        };
        let styles = match read_part(&mut archive, &styles_part) {
            Ok(styles) => Some(styles),
            Err(OpenError::MissingPart(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(SourceDocument { paragraphs, styles })
    }

    /// Parse the XML of a main document part
    pub fn parse_document_xml(xml: &str) -> Result<Vec<Paragraph>, OpenError> {
        let document = parse_tree(xml)?;
        if document.name != "document" {
            return Err(OpenError::Xml(format!(
                "expected a document root element, found '{}'",
                document.name
            )));
        }

        let body = document
            .child("body")
            .ok_or_else(|| OpenError::Xml("document has no body".to_string()))?;
        Ok(flatten_body(body))
    }

    // Packages normally point at word/document.xml, but the relationship is authoritative
    fn main_document_part<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String, OpenError> {
        let rels = match read_part(archive, PACKAGE_RELS_PART) {
            Ok(rels) => rels,
            Err(OpenError::MissingPart(_)) => return Ok(DOCUMENT_PART.to_string()),
            Err(e) => return Err(e),
        };

        let target = parse_tree(&rels)?
            .elements()
            .filter(|el| el.name == "Relationship")
            .find(|el| el.attr("Type").is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL)))
            .and_then(|el| el.attr("Target"))
            .map(|target| target.trim_start_matches('/').to_string());

        Ok(target.unwrap_or_else(|| DOCUMENT_PART.to_string()))
    }
}
