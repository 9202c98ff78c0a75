//! PDF rasterisation via pdfium.
//!
//! [`PdfiumSource`] owns the bound pdfium library for the whole run.
//! Each opened [`PdfiumDocument`] borrows it and is dropped as soon as the
//! orchestrator has finished that document's pages, releasing pdfium's
//! per-document allocations.
//!
//! ## Why scale by DPI / 72?
//!
//! PDF user space is measured in points (1/72 inch). Scaling the page by
//! `dpi / 72` renders it at exactly `dpi` pixels per inch on both axes,
//! whatever the physical page size.

use crate::error::{BatchError, StageError};
use crate::pipeline::raster::RasterPage;
use crate::pipeline::source::{check_pdf_header, Document, DocumentSource};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Render configuration for one page at `dpi`, antialiasing always on.
pub fn render_config(dpi: u32) -> PdfRenderConfig {
    PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / 72.0)
        .set_text_smoothing(true)
        .set_image_smoothing(true)
        .set_path_smoothing(true)
        .render_form_data(true)
        .render_annotations(true)
}

/// pdfium-backed [`DocumentSource`].
pub struct PdfiumSource {
    pdfium: Pdfium,
    password: Option<String>,
}

impl PdfiumSource {
    /// Bind the pdfium shared library.
    ///
    /// With `lib_dir` set only that directory is tried. Otherwise the working
    /// directory is tried first, then the system library search path.
    pub fn bind(lib_dir: Option<&Path>, password: Option<String>) -> Result<Self, BatchError> {
        let bindings = match lib_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| BatchError::PdfiumBindingFailed(format!("{:?}", e)))?;

        info!("pdfium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            password,
        })
    }
}

impl DocumentSource for PdfiumSource {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn Document + 'a>, StageError> {
        check_pdf_header(path)?;

        let document = self
            .pdfium
            .load_pdf_from_file(path, self.password.as_deref())
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                let detail = if err_str.contains("Password") || err_str.contains("password") {
                    if self.password.is_some() {
                        "wrong password".to_string()
                    } else {
                        "document is encrypted and requires a password".to_string()
                    }
                } else {
                    err_str
                };
                StageError::DocumentLoad {
                    path: path.to_path_buf(),
                    detail,
                }
            })?;

        debug!(
            "Opened {} ({} pages)",
            path.display(),
            document.pages().len()
        );
        Ok(Box::new(PdfiumDocument { document }))
    }
}

/// An open pdfium document; dropping it closes the document.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl Document for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<RasterPage, StageError> {
        let pages = self.document.pages();
        let total = pages.len() as usize;
        if index >= total {
            return Err(StageError::PageRender {
                page: index,
                detail: format!("index out of range (document has {total} pages)"),
            });
        }

        let page = pages
            .get(index as u16)
            .map_err(|e| StageError::PageRender {
                page: index,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page
            .render_with_config(&render_config(dpi))
            .map_err(|e| StageError::PageRender {
                page: index,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px @ {} dpi",
            index,
            image.width(),
            image.height(),
            dpi
        );

        RasterPage::from_image(&image).map_err(|e| StageError::PageRender {
            page: index,
            detail: e.to_string(),
        })
    }
}

