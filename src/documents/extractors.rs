//! Per-format text extraction
//!
//! Each supported format implements [`FormatExtractor`]; the
//! [`ExtractorRegistry`] is the dispatch table that picks one by file
//! extension. Adding a format means registering a new implementer, not
//! editing a branch chain.
//!
//! Extraction is synchronous CPU work over in-memory bytes. Failures stay
//! inside the extractor as [`ParseFailure`] values; nothing here panics
//! the caller, including the PDF interpreter which is run under
//! `catch_unwind`.

use crate::documents::DocumentFormat;
use calamine::{Reader as WorkbookReader, Xlsx};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use thiserror::Error;
use zip::ZipArchive;

/// Why an extractor could not produce text from the bytes it was given
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseFailure(String);

impl ParseFailure {
    fn new(message: impl Into<String>) -> Self {
        ParseFailure(message.into())
    }
}

/// Converts one document format's raw bytes into plain text
pub trait FormatExtractor: Send + Sync {
    /// The format this extractor understands
    fn format(&self) -> DocumentFormat;

    /// Whether this extractor handles the given file extension
    /// (case-insensitive, without the dot)
    fn can_handle(&self, extension: &str) -> bool {
        DocumentFormat::from_extension(extension) == Some(self.format())
    }

    /// Converts raw bytes to text
    fn extract(&self, bytes: &[u8]) -> Result<String, ParseFailure>;
}

/// Dispatch table over all registered [`FormatExtractor`]s
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn FormatExtractor>>,
}

impl ExtractorRegistry {
    /// Builds a registry with every built-in extractor
    pub fn new() -> Self {
        ExtractorRegistry {
            extractors: vec![
                Box::new(PdfExtractor),
                Box::new(DocxExtractor),
                Box::new(XlsxExtractor),
                Box::new(PptxExtractor),
                Box::new(TxtExtractor),
            ],
        }
    }

    /// Registers an additional extractor
    pub fn register(&mut self, extractor: Box<dyn FormatExtractor>) {
        self.extractors.push(extractor);
    }

    /// Finds the extractor responsible for a file extension, if any
    pub fn for_extension(&self, extension: &str) -> Option<&dyn FormatExtractor> {
        self.extractors
            .iter()
            .find(|extractor| extractor.can_handle(extension))
            .map(|extractor| extractor.as_ref())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        ExtractorRegistry::new()
    }
}

/// Plain-text passthrough; invalid UTF-8 sequences are replaced
pub struct TxtExtractor;

impl FormatExtractor for TxtExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Txt
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ParseFailure> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// PDF text extraction via the `pdf-extract` interpreter
pub struct PdfExtractor;

impl FormatExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ParseFailure> {
        // The interpreter panics on some malformed files; a panic is a
        // parse failure like any other
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(ParseFailure::new(err.to_string())),
            Err(_) => Err(ParseFailure::new("parser panicked on malformed input")),
        }
    }
}

/// XLSX extraction: every worksheet's rows as tab-joined cell values
pub struct XlsxExtractor;

impl FormatExtractor for XlsxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xlsx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ParseFailure> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|err| ParseFailure::new(format!("not a readable workbook: {err}")))?;

        let sheet_names = workbook.sheet_names().to_owned();
        let mut lines = Vec::new();
        for sheet_name in &sheet_names {
            let range = workbook
                .worksheet_range(sheet_name)
                .map_err(|err| ParseFailure::new(format!("sheet {sheet_name}: {err}")))?;
            for row in range.rows() {
                let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
                lines.push(cells.join("\t"));
            }
        }

        Ok(lines.join("\n"))
    }
}

/// DOCX extraction: paragraph text from the main document part
pub struct DocxExtractor;

impl FormatExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ParseFailure> {
        let xml = read_archive_entry(bytes, "word/document.xml")?;
        collect_text_runs(&xml, b"w:t", b"w:p")
    }
}

/// PPTX extraction: shape text from every slide, in slide order
pub struct PptxExtractor;

impl FormatExtractor for PptxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ParseFailure> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|err| ParseFailure::new(format!("not a readable archive: {err}")))?;

        // Slide entries are numbered, not zip-ordered
        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| slide_number(name).map(|number| (number, name.to_string())))
            .collect();
        slides.sort_by_key(|(number, _)| *number);

        let mut parts = Vec::new();
        for (_, name) in &slides {
            let mut xml = String::new();
            archive
                .by_name(name)
                .map_err(|err| ParseFailure::new(format!("slide {name}: {err}")))?
                .read_to_string(&mut xml)
                .map_err(|err| ParseFailure::new(format!("slide {name}: {err}")))?;
            let text = collect_text_runs(&xml, b"a:t", b"a:p")?;
            if !text.is_empty() {
                parts.push(text);
            }
        }

        Ok(parts.join("\n"))
    }
}

/// Reads one named entry of an OOXML container as a string
fn read_archive_entry(bytes: &[u8], entry_name: &str) -> Result<String, ParseFailure> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| ParseFailure::new(format!("not a readable archive: {err}")))?;
    let mut entry = archive
        .by_name(entry_name)
        .map_err(|err| ParseFailure::new(format!("missing {entry_name}: {err}")))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|err| ParseFailure::new(format!("{entry_name}: {err}")))?;
    Ok(xml)
}

/// Collects the character content of `run_tag` elements, emitting one line
/// per `paragraph_tag` element
fn collect_text_runs(
    xml: &str,
    run_tag: &[u8],
    paragraph_tag: &[u8],
) -> Result<String, ParseFailure> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref start)) if start.name().as_ref() == run_tag => in_run = true,
            Ok(Event::End(ref end)) if end.name().as_ref() == run_tag => in_run = false,
            Ok(Event::End(ref end)) if end.name().as_ref() == paragraph_tag => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Ok(Event::Text(text)) if in_run => {
                let unescaped = text
                    .unescape()
                    .map_err(|err| ParseFailure::new(format!("malformed xml text: {err}")))?;
                out.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ParseFailure::new(format!("malformed xml: {err}"))),
            _ => {}
        }
    }

    Ok(out.trim_end().to_string())
}

/// Parses `ppt/slides/slideN.xml` entry names into their slide number
fn slide_number(entry_name: &str) -> Option<u32> {
    entry_name
        .strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}
