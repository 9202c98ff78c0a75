//! Pipeline stages for PDF-to-page-artifact conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the rendering or OCR backend can be swapped without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ transform ──┬──▶ encode   (p_<i>.webp)
//! (walk)    (pdfium)   (resize)    └──▶ ocr      (p_<i>.txt)
//! ```
//!
//! 1. [`input`]     — lazily enumerate `*.pdf` files below the input root
//! 2. [`source`]    — the `DocumentSource` / `Document` seam
//! 3. [`render`]    — pdfium implementation: open documents, rasterise pages
//! 4. [`raster`]    — owned RGBA page buffers passed between stages
//! 5. [`transform`] — scale to the target width, aspect preserved
//! 6. [`encode`]    — lossy WebP encoding at a validated quality
//! 7. [`ocr`]       — scoped OCR engines (Tesseract behind `tesseract`)

pub mod encode;
pub mod input;
pub mod ocr;
pub mod raster;
pub mod render;
pub mod source;
pub mod transform;
