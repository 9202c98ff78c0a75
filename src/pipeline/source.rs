//! Document source seam: open a PDF, report its page count, render pages.
//!
//! The orchestrator only talks to these traits. The pdfium implementation
//! lives in [`crate::pipeline::render`]; tests substitute in-memory fakes to
//! inject corrupt documents and failing pages.
//!
//! A document handle is released when its `Box<dyn Document>` is dropped, so
//! the orchestrator scopes each handle to the processing of one document.

use crate::error::StageError;
use crate::pipeline::raster::RasterPage;
use std::io::Read;
use std::path::Path;

/// Opens documents from storage.
pub trait DocumentSource {
    /// Open the document at `path`.
    ///
    /// Fails with [`StageError::DocumentLoad`] when the file is missing,
    /// unreadable, encrypted without a matching password, or not a PDF.
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn Document + 'a>, StageError>;
}

/// An opened document.
pub trait Document {
    /// Number of pages; known only after opening.
    fn page_count(&self) -> usize;

    /// Render page `index` (0-based) at `dpi` on both axes.
    ///
    /// Fails with [`StageError::PageRender`] for an out-of-range index or a
    /// backend failure.
    fn render_page(&self, index: usize, dpi: u32) -> Result<RasterPage, StageError>;
}

/// Reject files that are missing, unreadable, or lack the `%PDF` header.
///
/// Runs before the rendering backend sees the file so a stray `.pdf` that
/// is really HTML yields a readable error instead of a backend code.
pub fn check_pdf_header(path: &Path) -> Result<(), StageError> {
    let load_err = |detail: String| StageError::DocumentLoad {
        path: path.to_path_buf(),
        detail,
    };

    let mut f = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => load_err("file not found".into()),
        std::io::ErrorKind::PermissionDenied => load_err("permission denied".into()),
        _ => load_err(e.to_string()),
    })?;

    let mut magic = [0u8; 4];
    if f.read_exact(&mut magic).is_err() {
        return Err(load_err("file is shorter than a PDF header".into()));
    }
    if &magic != b"%PDF" {
        return Err(load_err(format!("not a PDF (first bytes: {magic:?})")));
    }
    Ok(())
}
