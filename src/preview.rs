//! On-demand page previews: rasterise single PDF pages to PNG via pdfium.
//!
//! Preview is a purely visual affordance — nothing downstream consumes the
//! pixels, and the text pipeline never depends on this module. Pages are
//! rendered lazily, one at a time, as the caller asks for them; each page
//! is rasterised at most once and the PNG bytes are cached for the lifetime
//! of the [`PagePreview`].
//!
//! ## Why spawn_blocking?
//!
//! pdfium wraps a C++ library that is not async-safe; rendering is
//! CPU-bound. Running it on the blocking pool keeps the tokio workers free,
//! exactly as the text extractor does for parsing.

use crate::error::LensError;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Lazy page-by-page preview renderer for one PDF document.
pub struct PagePreview {
    bytes: Arc<Vec<u8>>,
    scale: f32,
    cache: Mutex<HashMap<usize, Arc<Vec<u8>>>>,
}

impl PagePreview {
    /// Wrap raw PDF bytes for preview rendering at a fixed scale factor.
    ///
    /// The document is not opened until the first render or page-count
    /// request, so constructing a preview is free.
    pub fn new(bytes: Vec<u8>, scale: f32) -> Self {
        Self {
            bytes: Arc::new(bytes),
            scale,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of pages in the document.
    pub async fn page_count(&self) -> Result<usize, LensError> {
        let bytes = Arc::clone(&self.bytes);
        tokio::task::spawn_blocking(move || {
            let pdfium = Pdfium::default();
            let document = open_document(&pdfium, &bytes)?;
            Ok(document.pages().len() as usize)
        })
        .await
        .map_err(|e| LensError::Internal(format!("page-count task panicked: {e}")))?
    }

    /// Render one page (0-indexed) to PNG bytes, rasterising on first use
    /// and serving the cache afterwards.
    pub async fn render_page(&self, index: usize) -> Result<Arc<Vec<u8>>, LensError> {
        if let Some(png) = self.cache.lock().unwrap().get(&index) {
            debug!("page {} served from cache", index + 1);
            return Ok(Arc::clone(png));
        }

        match self.spawn_render(index).wait().await? {
            Some(png) => {
                let png = Arc::new(png);
                self.cache
                    .lock()
                    .unwrap()
                    .insert(index, Arc::clone(&png));
                Ok(png)
            }
            // Unreachable: we held the only handle and never cancelled it.
            None => Err(LensError::Internal("render task vanished".into())),
        }
    }

    /// Start an abortable render of one page (0-indexed).
    ///
    /// Use this instead of [`Self::render_page`] when the caller may lose
    /// interest before the render completes (scroll-away, teardown) — call
    /// [`RenderTask::cancel`] and the task resolves to `None` rather than
    /// an error. The result is not cached; cancellable renders are for
    /// fire-and-forget consumers.
    pub fn spawn_render(&self, index: usize) -> RenderTask {
        let bytes = Arc::clone(&self.bytes);
        let scale = self.scale;
        let handle = tokio::task::spawn_blocking(move || render_page_blocking(&bytes, index, scale));
        RenderTask { page: index, handle }
    }
}

/// An in-flight page render that may be cancelled.
pub struct RenderTask {
    page: usize,
    handle: tokio::task::JoinHandle<Result<Vec<u8>, LensError>>,
}

impl RenderTask {
    /// 0-indexed page this task is rendering.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Cancel the render. Takes effect before the blocking closure starts;
    /// a rasterisation already under way runs to completion and its result
    /// is discarded.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Wait for the render. `Ok(None)` means the task was cancelled —
    /// cancellation is not an error.
    pub async fn wait(self) -> Result<Option<Vec<u8>>, LensError> {
        match self.handle.await {
            Ok(result) => result.map(Some),
            Err(e) if e.is_cancelled() => Ok(None),
            Err(e) => Err(LensError::Internal(format!("render task panicked: {e}"))),
        }
    }
}

// ── Blocking implementation ──────────────────────────────────────────────

fn open_document<'a>(pdfium: &'a Pdfium, bytes: &'a [u8]) -> Result<PdfDocument<'a>, LensError> {
    pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| LensError::PdfParseError {
            detail: format!("{e:?}"),
        })
}

fn render_page_blocking(bytes: &[u8], index: usize, scale: f32) -> Result<Vec<u8>, LensError> {
    let pdfium = Pdfium::default();
    let document = open_document(&pdfium, bytes)?;
    let pages = document.pages();
    let total = pages.len() as usize;

    if index >= total {
        return Err(LensError::RenderFailed {
            page: index + 1,
            detail: format!("out of range (document has {total} pages)"),
        });
    }

    let page = pages.get(index as u16).map_err(|e| LensError::RenderFailed {
        page: index + 1,
        detail: format!("{e:?}"),
    })?;

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| LensError::RenderFailed {
            page: index + 1,
            detail: format!("{e:?}"),
        })?;

    let image = bitmap.as_image();
    debug!("rendered page {} → {}x{} px", index + 1, image.width(), image.height());

    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| LensError::RenderFailed {
            page: index + 1,
            detail: format!("PNG encoding failed: {e}"),
        })?;
    Ok(buf)
}
