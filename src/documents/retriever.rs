//! Document download pipeline
//!
//! The [`DocumentRetriever`] downloads one document URL, stores the bytes
//! under the configured directory, and hands them to the matching format
//! extractor. Concurrency is bounded by an internal semaphore so a page
//! full of report links cannot stampede the target server.
//!
//! `retrieve` always yields a [`DocumentRecord`]: failures are folded into
//! the record's tagged text instead of aborting the batch.

use crate::config::DocumentsConfig;
use crate::documents::extractors::ExtractorRegistry;
use crate::documents::{DocumentFormat, DocumentRecord, DocumentText};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

/// Longest sanitized file-name segment kept when storing a download
const MAX_FILENAME_LEN: usize = 100;

/// Why a document download produced no stored bytes
#[derive(Debug, Error)]
enum DownloadError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),
    #[error("{0}")]
    Transport(String),
    #[error("could not store file: {0}")]
    Storage(#[from] std::io::Error),
}

/// Downloads documents and extracts their text
pub struct DocumentRetriever {
    client: Client,
    registry: ExtractorRegistry,
    download_dir: PathBuf,
    timeout: Duration,
    semaphore: Semaphore,
}

impl DocumentRetriever {
    /// Creates a retriever writing into the configured download directory
    ///
    /// The `client` is shared with the page fetcher so connection pools and
    /// headers stay consistent across the whole research run.
    pub fn new(client: Client, config: &DocumentsConfig) -> Self {
        DocumentRetriever {
            client,
            registry: ExtractorRegistry::new(),
            download_dir: PathBuf::from(&config.download_dir),
            timeout: Duration::from_secs(config.download_timeout_secs),
            semaphore: Semaphore::new(config.max_concurrent_downloads),
        }
    }

    /// Downloads one document and extracts its text
    ///
    /// Never fails the caller: download errors yield a record with
    /// [`DocumentText::DownloadFailed`] and an empty storage location,
    /// parse errors a record with [`DocumentText::ParseFailed`], and
    /// unrecognized extensions [`DocumentText::Unsupported`].
    pub async fn retrieve(&self, url: &Url) -> DocumentRecord {
        let format = DocumentFormat::from_url(url);

        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return self.failed_record(url, format, "download pool closed".to_string());
            }
        };

        tracing::debug!(url = %url, "Downloading document");

        let bytes = match self.download(url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "Document download failed");
                return self.failed_record(url, format, err.to_string());
            }
        };

        let storage_location = match self.store(url, &bytes).await {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "Could not store document");
                return self.failed_record(url, format, err.to_string());
            }
        };

        let extension = file_extension(url);
        let text = match self.registry.for_extension(&extension) {
            Some(extractor) => match extractor.extract(&bytes) {
                Ok(text) => DocumentText::Extracted(text),
                Err(failure) => {
                    tracing::warn!(
                        url = %url,
                        error = %failure,
                        "Document parse failed"
                    );
                    DocumentText::ParseFailed(failure.to_string())
                }
            },
            None => DocumentText::Unsupported(extension),
        };

        DocumentRecord {
            source_url: url.clone(),
            format,
            storage_location,
            text,
        }
    }

    fn failed_record(
        &self,
        url: &Url,
        format: Option<DocumentFormat>,
        detail: String,
    ) -> DocumentRecord {
        DocumentRecord {
            source_url: url.clone(),
            format,
            storage_location: PathBuf::new(),
            text: DocumentText::DownloadFailed(detail),
        }
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, DownloadError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|err| self.classify(err))?;
        Ok(bytes.to_vec())
    }

    fn classify(&self, err: reqwest::Error) -> DownloadError {
        if err.is_timeout() {
            DownloadError::Timeout(self.timeout)
        } else {
            DownloadError::Transport(err.to_string())
        }
    }

    async fn store(&self, url: &Url, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(local_filename(url));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

/// File extension of the URL path's final segment, lowercased
fn file_extension(url: &Url) -> String {
    Path::new(url.path())
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Local file name for a document URL
///
/// Sanitized final path segment prefixed with a short digest of the full
/// URL, so distinct URLs sharing a file name never collide on disk.
fn local_filename(url: &Url) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let prefix = hex::encode(&digest[..4]);

    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    let sanitized = sanitize_segment(segment);

    if sanitized.is_empty() {
        prefix
    } else {
        format!("{prefix}-{sanitized}")
    }
}

/// Replaces bytes outside `[A-Za-z0-9._-]` and caps the length
fn sanitize_segment(segment: &str) -> String {
    let mut sanitized: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    sanitized.truncate(MAX_FILENAME_LEN);
    sanitized.trim_matches('-').to_string()
}
