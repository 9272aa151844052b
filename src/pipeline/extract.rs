//! PDF text extraction: raw bytes → one concatenated text blob + page count.
//!
//! Reads the text layer embedded in the PDF's content streams, exactly as
//! the underlying library reports it — no OCR, no layout reconstruction.
//! Each page's fragments are joined with single spaces and prefixed with a
//! `[Page k]` marker so downstream chunking keeps page boundaries as a
//! human-readable cue inside the model prompt.
//!
//! Parsing a large PDF is CPU-bound, so the async entry point moves the work
//! onto the blocking thread pool rather than stalling the runtime.

use crate::error::LensError;
use tracing::debug;

/// The extracted text layer of a PDF.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Per-page blocks (`[Page k] …`) concatenated in page order, outer
    /// whitespace trimmed.
    pub text: String,
    /// Total page count of the document.
    pub pages: usize,
}

/// Extract the text layer from raw PDF bytes.
///
/// Fails with [`LensError::PdfParseError`] when the document cannot be
/// opened (corrupt or encrypted input); no partial text is returned.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedDocument, LensError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| LensError::PdfParseError {
            detail: e.to_string(),
        })?;

    let blocks: Vec<String> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            // The extractor reports each page as a sequence of text
            // fragments separated by whitespace; normalise to single spaces.
            let joined = page.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("[Page {}] {}", i + 1, joined)
        })
        .collect();

    let text = blocks.join("\n\n").trim().to_string();
    debug!("extracted {} chars from {} pages", text.len(), pages.len());

    Ok(ExtractedDocument {
        text,
        pages: pages.len(),
    })
}

/// Async wrapper around [`extract_text`] for use inside the tokio runtime.
pub async fn extract_text_async(bytes: Vec<u8>) -> Result<ExtractedDocument, LensError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| LensError::Internal(format!("extraction task panicked: {e}")))?
}
