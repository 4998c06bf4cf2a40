//! Text extraction for uploaded documents.
//!
//! A document is read page by page and the page texts are concatenated in
//! page order. PDFs go through `pdf-extract`; plain text and markdown files
//! are treated as a single page.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("{path} is not valid UTF-8 text")]
    InvalidUtf8 { path: PathBuf },

    #[error("unsupported document format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("no extractable text in {path}")]
    NoText { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

/// An extracted document: page texts in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pages: Vec<String>,
}

impl Document {
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Concatenation of every page, in order, with nothing inserted between pages.
    pub fn text(&self) -> String {
        self.pages.concat()
    }
}

/// Reads the document at `path` and returns its pages.
///
/// A document whose pages are all blank is rejected with
/// [`ExtractionError::NoText`].
///
/// Blocking. Callers on the async runtime should go through
/// `tokio::task::spawn_blocking`.
pub fn extract_document(path: &Path) -> Result<Document, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document = match detect_format(path, &bytes)? {
        DocumentFormat::Pdf => {
            let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
                ExtractionError::Pdf {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
            Document::from_pages(pages)
        }
        DocumentFormat::PlainText => {
            let text = String::from_utf8(bytes).map_err(|_| ExtractionError::InvalidUtf8 {
                path: path.to_path_buf(),
            })?;
            Document::from_pages(vec![text])
        }
    };

    for (number, page) in document.pages().iter().enumerate() {
        debug!(
            "{} page {}: {} chars",
            path.display(),
            number + 1,
            page.chars().count()
        );
    }

    // Image-only PDFs and empty text files parse fine but carry nothing to index.
    if document.pages().iter().all(|page| page.trim().is_empty()) {
        return Err(ExtractionError::NoText {
            path: path.to_path_buf(),
        });
    }

    debug!(
        "Extracted {} page(s) from {}",
        document.page_count(),
        path.display()
    );
    Ok(document)
}

/// Convenience wrapper returning only the concatenated text.
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    extract_document(path).map(|doc| doc.text())
}

/// Magic bytes win over the file extension; uploads often arrive with
/// temporary names.
fn detect_format(path: &Path, bytes: &[u8]) -> Result<DocumentFormat, ExtractionError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(DocumentFormat::Pdf);
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => Ok(DocumentFormat::Pdf),
        Some("txt") | Some("md") | Some("markdown") => Ok(DocumentFormat::PlainText),
        _ => Err(ExtractionError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_document_text_concatenates_pages_in_order() {
        let doc = Document::from_pages(vec![
            "Page one.".to_string(),
            "Page two.".to_string(),
            "Page three.".to_string(),
        ]);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.text(), "Page one.Page two.Page three.");
    }

    #[test]
    fn test_plain_text_file_is_single_page() {
        let file = write_temp(".txt", b"Jane Doe\nSenior Rust Engineer\n");
        let doc = extract_document(file.path()).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.text(), "Jane Doe\nSenior Rust Engineer\n");
    }

    #[test]
    fn test_markdown_extension_is_case_insensitive() {
        let file = write_temp(".MD", b"# Coursework\n\nDistributed Systems");
        assert_eq!(
            extract_text(file.path()).unwrap(),
            "# Coursework\n\nDistributed Systems"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("resume.pdf");
        let err = extract_document(&missing).unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }

    #[test]
    fn test_corrupt_pdf_is_pdf_error() {
        let file = write_temp(".pdf", b"%PDF-1.7\nthis is not really a pdf");
        let err = extract_document(file.path()).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf { .. }), "got {err:?}");
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let file = write_temp(".docx", b"PK\x03\x04 not supported");
        let err = extract_document(file.path()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_invalid_utf8_text_is_rejected() {
        let file = write_temp(".txt", &[0xff, 0xfe, 0xfd]);
        let err = extract_document(file.path()).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_empty_text_file_has_no_text() {
        let file = write_temp(".txt", b"");
        let err = extract_document(file.path()).unwrap_err();
        assert!(matches!(err, ExtractionError::NoText { .. }), "got {err:?}");
    }

    #[test]
    fn test_whitespace_only_file_has_no_text() {
        let file = write_temp(".md", b"  \n\n\t \n");
        let err = extract_text(file.path()).unwrap_err();
        assert!(matches!(err, ExtractionError::NoText { .. }), "got {err:?}");
    }

    #[test]
    fn test_pdf_magic_overrides_extension() {
        assert_eq!(
            detect_format(Path::new("upload.bin"), b"%PDF-1.4 ...").unwrap(),
            DocumentFormat::Pdf
        );
    }
}
