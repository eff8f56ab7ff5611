//! Document retrieval and text extraction
//!
//! Company sites link reports, handbooks, and spreadsheets next to their
//! pages. This module downloads those files and converts them to plain
//! text: [`retriever`] owns the download pipeline, [`extractors`] the
//! per-format converters.
//!
//! Extraction outcomes are kept as a tagged [`DocumentText`] internally;
//! the user-visible placeholder strings are rendered only at the
//! serialization boundary, so callers can tell real content from a
//! failure without string matching.

pub mod extractors;
pub mod retriever;

pub use extractors::{ExtractorRegistry, FormatExtractor};
pub use retriever::DocumentRetriever;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// A document format this crate can extract text from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Xlsx,
    Pptx,
    Txt,
}

impl DocumentFormat {
    /// Maps a file extension (case-insensitive, without the dot) to a format
    ///
    /// # Example
    ///
    /// ```
    /// use dossier::documents::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
    /// assert_eq!(DocumentFormat::from_extension("zip"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "xlsx" => Some(DocumentFormat::Xlsx),
            "pptx" => Some(DocumentFormat::Pptx),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }

    /// Classifies a URL by the extension of its path's final segment
    ///
    /// Query strings and fragments do not affect classification.
    pub fn from_url(url: &Url) -> Option<Self> {
        Path::new(url.path())
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }

    /// Upper-case format name used in logs and serialized records
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Xlsx => "XLSX",
            DocumentFormat::Pptx => "PPTX",
            DocumentFormat::Txt => "TXT",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of turning downloaded bytes into text
///
/// Failure variants carry a short detail string for logs; the user-facing
/// placeholder is rendered by [`DocumentRecord::extracted_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentText {
    /// Text extraction succeeded (possibly with empty text)
    Extracted(String),
    /// The download itself failed; no bytes were stored
    DownloadFailed(String),
    /// Bytes were stored but the format extractor rejected them
    ParseFailed(String),
    /// The URL's extension matches no registered extractor
    Unsupported(String),
}

impl DocumentText {
    /// True when the document yielded real text rather than a failure
    pub fn is_extracted(&self) -> bool {
        matches!(self, DocumentText::Extracted(_))
    }
}

/// One retrieved document belonging to a [`SiteResult`](crate::SiteResult)
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    /// URL the document was downloaded from
    pub source_url: Url,
    /// Format derived from the URL, `None` for unrecognized extensions
    pub format: Option<DocumentFormat>,
    /// Local path of the stored bytes, empty when the download failed
    pub storage_location: PathBuf,
    /// Tagged extraction outcome
    pub text: DocumentText,
}

impl DocumentRecord {
    /// Renders the text the way consumers see it: extracted content on
    /// success, a bracketed placeholder naming the format on failure
    pub fn extracted_text(&self) -> String {
        let format = self.format.map(DocumentFormat::name).unwrap_or("unknown");
        match &self.text {
            DocumentText::Extracted(text) => text.clone(),
            DocumentText::DownloadFailed(detail) => {
                format!("[could not download {format} document: {detail}]")
            }
            DocumentText::ParseFailed(detail) => {
                format!("[could not extract text from {format} document: {detail}]")
            }
            DocumentText::Unsupported(extension) => {
                format!("[unsupported document format: {extension}]")
            }
        }
    }
}

impl Serialize for DocumentRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut record = serializer.serialize_struct("DocumentRecord", 4)?;
        record.serialize_field("source_url", &self.source_url)?;
        record.serialize_field(
            "format",
            self.format.map(DocumentFormat::name).unwrap_or("unknown"),
        )?;
        record.serialize_field("storage_location", &self.storage_location)?;
        record.serialize_field("extracted_text", &self.extracted_text())?;
        record.end()
    }
}
