use std::io::Write;
use std::path::Path;
use std::time::Duration;

use pdf_oxide::PdfDocument;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracts plain text from uploaded PDF documents.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    timeout: Duration,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self {
            timeout: EXTRACTION_TIMEOUT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Not a PDF document")]
    NotPdf,

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF extraction timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of every non-blank page, pages separated by a blank line.
    /// A PDF without any text layer yields an empty string.
    pub async fn extract_text(&self, data: &[u8]) -> Result<String, PdfError> {
        if !data.starts_with(b"%PDF") {
            return Err(PdfError::NotPdf);
        }

        let mut temp_file = tempfile::NamedTempFile::new()?;
        temp_file.write_all(data)?;
        temp_file.flush()?;

        let size_bytes = data.len();
        let pages = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || {
                let pages = extract_pages(temp_file.path());
                drop(temp_file);
                pages
            }),
        )
        .await
        .map_err(|_| PdfError::Timeout)?
        .map_err(|e| PdfError::Parse(format!("task join error: {e}")))??;

        tracing::info!(size_bytes, page_count = pages.len(), "PDF text extraction complete");

        Ok(pages.join("\n\n"))
    }
}

fn extract_pages(path: &Path) -> Result<Vec<String>, PdfError> {
    let doc = PdfDocument::open(path).map_err(|e| PdfError::Parse(e.to_string()))?;

    let page_count = doc
        .page_count()
        .map_err(|e| PdfError::Parse(format!("failed to read page count: {e}")))?;

    let mut pages = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        let text = doc.extract_text(page_index).unwrap_or_default();
        let text = text.trim();
        if !text.is_empty() {
            pages.push(text.to_string());
        }
    }

    Ok(pages)
}
