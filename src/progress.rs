//! Progress-callback trait for per-document and per-page batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::batch::BatchRunner::with_progress`] to receive events as the
//! orchestrator walks the tree. The CLI uses it to drive its progress bar;
//! library callers can forward events anywhere without the pipeline knowing
//! how the host application reports progress.
//!
//! # Example
//!
//! ```rust
//! use pdf2pages::BatchProgressCallback;
//! use std::path::Path;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, _document: &Path, _page_index: usize, _page_count: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as it processes documents and pages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive from a single thread, in order.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the input root has been validated.
    fn on_run_start(&self, input_root: &Path) {
        let _ = input_root;
    }

    /// Called when a document has been opened.
    ///
    /// # Arguments
    /// * `document`   — path of the PDF
    /// * `page_count` — number of pages about to be processed
    fn on_document_start(&self, document: &Path, page_count: usize) {
        let _ = (document, page_count);
    }

    /// Called after a page's artifacts have been written.
    ///
    /// # Arguments
    /// * `page_index` — 0-based page index
    fn on_page_complete(&self, document: &Path, page_index: usize, page_count: usize) {
        let _ = (document, page_index, page_count);
    }

    /// Called when a page or one of its artifacts failed.
    fn on_page_error(&self, document: &Path, page_index: usize, page_count: usize, error: &str) {
        let _ = (document, page_index, page_count, error);
    }

    /// Called when every page of a document has been attempted.
    fn on_document_complete(&self, document: &Path, pages_ok: usize, page_count: usize) {
        let _ = (document, pages_ok, page_count);
    }

    /// Called when a document could not be processed at all.
    fn on_document_error(&self, document: &Path, error: &str) {
        let _ = (document, error);
    }

    /// Called when a document opened but produced nothing (e.g. no pages).
    fn on_document_skipped(&self, document: &Path, reason: &str) {
        let _ = (document, reason);
    }

    /// Called once after the walk is exhausted.
    fn on_run_complete(&self, documents: usize, documents_failed: usize) {
        let _ = (documents, documents_failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias for the shared callback handle.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
