//! Error types for the pdf2pages library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BatchError`] — **Fatal**: the run cannot proceed at all (invalid
//!   configuration, unreadable input root, pdfium missing). Returned as
//!   `Err(BatchError)` from setup and from [`crate::batch::BatchRunner::run`].
//!
//! * [`StageError`] — **Non-fatal**: one document, page, or artifact failed
//!   but the rest of the batch is fine. Stored inside
//!   [`crate::report::BatchReport`] so callers can inspect partial success
//!   after the run instead of losing the whole tree to one bad file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2pages library.
#[derive(Debug, Error)]
pub enum BatchError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// The input root does not exist, is not a directory, or cannot be listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A subdirectory below the input root could not be listed.
    #[error("Cannot list directory '{path}': {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The output root could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The run-wide OCR engine could not be initialised.
    #[error("OCR engine for language '{language}' could not be initialised: {detail}")]
    EngineInit { language: String, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n\
  • Set PDFIUM_LIB_PATH=/path/to/dir-containing-libpdfium.\n"
    )]
    PdfiumBindingFailed(String),
}

impl BatchError {
    /// Whether this error means the input tree itself could not be read.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BatchError::InputRootUnreadable { .. } | BatchError::DirectoryUnreadable { .. }
        )
    }
}

/// A non-fatal error for a single document, page, or artifact.
///
/// The orchestrator logs it, records it in the report, and moves on to the
/// next item at the same granularity.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StageError {
    /// The document is missing, unreadable, encrypted, or not a PDF.
    #[error("Failed to load '{path}': {detail}")]
    DocumentLoad { path: PathBuf, detail: String },

    /// Page rasterisation failed (out-of-range index or backend failure).
    #[error("Page {page}: rasterisation failed: {detail}")]
    PageRender { page: usize, detail: String },

    /// The page image could not be resized.
    #[error("Page {page}: resize failed: {detail}")]
    Transform { page: usize, detail: String },

    /// The compressed image artifact could not be written.
    #[error("Failed to encode image '{path}': {detail}")]
    Encode { path: PathBuf, detail: String },

    /// The OCR engine failed on a page.
    #[error("Page {page}: text extraction failed: {detail}")]
    OcrExtraction { page: usize, detail: String },

    /// The OCR engine could not be initialised for this scope.
    #[error("OCR engine for language '{language}' could not be initialised: {detail}")]
    EngineInit { language: String, detail: String },

    /// The per-document output directory could not be computed or created.
    #[error("Output layout failed for '{path}': {detail}")]
    Layout { path: PathBuf, detail: String },

    /// The text artifact could not be written.
    #[error("Failed to write text '{path}': {detail}")]
    TextWrite { path: PathBuf, detail: String },
}

impl StageError {
    /// Short machine-friendly name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::DocumentLoad { .. } => "open",
            StageError::PageRender { .. } => "render",
            StageError::Transform { .. } => "resize",
            StageError::Encode { .. } => "encode",
            StageError::OcrExtraction { .. } => "ocr",
            StageError::EngineInit { .. } => "engine-init",
            StageError::Layout { .. } => "layout",
            StageError::TextWrite { .. } => "write-text",
        }
    }
}
