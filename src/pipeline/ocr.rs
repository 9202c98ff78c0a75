//! Text extraction: scoped OCR engines behind a backend trait.
//!
//! An [`OcrBackend`] hands out [`OcrEngine`]s bound to one language model.
//! Loading a model is expensive, so the orchestrator decides how long an
//! engine lives ([`crate::config::EngineScope`]). Engines are released when
//! dropped, exactly once, whether the scope finished normally or bailed out
//! early on an error.
//!
//! `extract_text` takes `&mut self`: an engine can only ever serve one
//! processing stream at a time.

use crate::error::StageError;
use crate::pipeline::raster::ResizedPage;

/// Factory for OCR engines.
pub trait OcrBackend {
    /// Load `language` and return a ready engine.
    ///
    /// Fails with [`StageError::EngineInit`] when the model cannot be loaded
    /// (e.g. missing traineddata files).
    fn acquire(&self, language: &str) -> Result<Box<dyn OcrEngine>, StageError>;

    /// Whether this backend produces text at all.
    ///
    /// The orchestrator skips engine acquisition and text artifacts when
    /// this is `false`.
    fn enabled(&self) -> bool {
        true
    }
}

/// A loaded OCR engine.
pub trait OcrEngine {
    /// Recognise the text on `page`.
    ///
    /// Returns UTF-8 text, possibly empty for a blank page. `page_index` is
    /// only used for error context.
    fn extract_text(&mut self, page: &ResizedPage, page_index: usize) -> Result<String, StageError>;
}

/// Backend used when text extraction is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledOcr;

impl OcrBackend for DisabledOcr {
    fn acquire(&self, language: &str) -> Result<Box<dyn OcrEngine>, StageError> {
        Err(StageError::EngineInit {
            language: language.to_string(),
            detail: "text extraction is disabled".into(),
        })
    }

    fn enabled(&self) -> bool {
        false
    }
}

#[cfg(feature = "tesseract")]
pub use self::tesseract::TesseractBackend;

#[cfg(feature = "tesseract")]
mod tesseract {
    use super::{OcrBackend, OcrEngine};
    use crate::error::StageError;
    use crate::pipeline::raster::ResizedPage;
    use leptess::LepTess;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tracing::debug;

    /// Tesseract via leptess.
    ///
    /// The tessdata directory is passed to the engine explicitly rather than
    /// through `TESSDATA_PREFIX`, so two backends in one process can point at
    /// different model sets.
    #[derive(Debug, Clone, Default)]
    pub struct TesseractBackend {
        datapath: Option<PathBuf>,
    }

    impl TesseractBackend {
        pub fn new(datapath: Option<PathBuf>) -> Self {
            Self { datapath }
        }
    }

    impl OcrBackend for TesseractBackend {
        fn acquire(&self, language: &str) -> Result<Box<dyn OcrEngine>, StageError> {
            let datapath = self
                .datapath
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned());
            let lt = LepTess::new(datapath.as_deref(), language).map_err(|e| {
                StageError::EngineInit {
                    language: language.to_string(),
                    detail: format!("{:?}", e),
                }
            })?;
            debug!("Tesseract engine loaded for '{}'", language);
            Ok(Box::new(TesseractEngine { lt }))
        }
    }

    struct TesseractEngine {
        lt: LepTess,
    }

    impl OcrEngine for TesseractEngine {
        fn extract_text(
            &mut self,
            page: &ResizedPage,
            page_index: usize,
        ) -> Result<String, StageError> {
            let ocr_err = |detail: String| StageError::OcrExtraction {
                page: page_index,
                detail,
            };

            // Leptonica reads encoded images; PNG keeps the pixels lossless.
            let mut png = Vec::new();
            page.raster()
                .to_rgba_image()
                .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                .map_err(|e| ocr_err(e.to_string()))?;

            self.lt
                .set_image_from_mem(&png)
                .map_err(|e| ocr_err(format!("{:?}", e)))?;
            self.lt
                .get_utf8_text()
                .map_err(|e| ocr_err(e.to_string()))
        }
    }
}
