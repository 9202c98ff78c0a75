//! # pdf2pages
//!
//! Batch-convert a directory tree of PDF documents into per-page WebP images
//! and per-page OCR text, mirroring the input tree in the output.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input_root/
//!  │
//!  ├─ 1. Walk      lazily find *.pdf (case-insensitive), sorted per directory
//!  ├─ 2. Open      pdfium document, scoped to one document
//!  ├─ 3. Render    each page at `dpi` into an owned RGBA buffer
//!  ├─ 4. Resize    to `target_width`, aspect ratio preserved
//!  ├─ 5. Encode    WebP at `quality`      → output_root/<rel>/<stem>/p_<i>.webp
//!  ├─ 6. OCR       Tesseract `language`   → output_root/<rel>/<stem>/p_<i>.txt
//!  └─ 7. Report    per-document / per-page outcomes + stats
//! ```
//!
//! Page indices in artifact names are 0-based. A bad document, page, or
//! artifact is logged and recorded in the [`BatchReport`]; it never aborts
//! the rest of the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2pages::{convert_tree, BatchConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .input_root("pdfs")
//!         .output_root("pages")
//!         .target_width(700)
//!         .quality(75)
//!         .build()?;
//!     let report = convert_tree(&config, None)?;
//!     eprintln!("{} pages, {} failed", report.stats.pages_total, report.stats.pages_failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature     | Default | Description |
//! |-------------|---------|-------------|
//! | `cli`       | on      | Enables the `pdf2pages` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `tesseract` | on      | Tesseract OCR via leptess; needs libtesseract/libleptonica at build time |
//!
//! A build with `--no-default-features --features cli` drops Tesseract; text
//! extraction must then be disabled (`BatchConfig::builder().extract_text(false)`,
//! or `--no-ocr` on the CLI).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod progress;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::BatchRunner;
pub use config::{BatchConfig, BatchConfigBuilder, EngineScope, Quality};
pub use convert::{convert_tree, ocr_backend};
pub use error::{BatchError, StageError};
pub use pipeline::ocr::{DisabledOcr, OcrBackend, OcrEngine};
pub use pipeline::raster::{RasterPage, ResizedPage};
pub use pipeline::source::{Document, DocumentSource};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{
    ArtifactStatus, BatchReport, BatchStats, DocumentOutcome, DocumentReport, PageOutcome,
    PageReport,
};

#[cfg(feature = "tesseract")]
pub use pipeline::ocr::TesseractBackend;
