//! One-call entry point wiring the real backends into a [`BatchRunner`].
//!
//! [`convert_tree`] binds pdfium, picks the OCR backend the crate was built
//! with, and runs the batch once. Callers that need fakes, a shared pdfium
//! binding, or a custom OCR backend build a [`BatchRunner`] themselves.

use crate::batch::BatchRunner;
use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::pipeline::ocr::{DisabledOcr, OcrBackend};
use crate::pipeline::render::PdfiumSource;
use crate::progress::ProgressCallback;
use crate::report::BatchReport;

/// Convert every PDF below `config.input_root`.
///
/// # Returns
/// `Ok(BatchReport)` whenever setup succeeded, even if individual documents
/// or pages failed (check `report.stats`).
///
/// # Errors
/// Returns `Err(BatchError)` only for fatal errors:
/// - pdfium cannot be bound
/// - text extraction requested from a build without the `tesseract` feature
/// - the input root is unreadable or the output root cannot be created
/// - the run-wide OCR engine fails to load (`EngineScope::PerRun`)
pub fn convert_tree(
    config: &BatchConfig,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport, BatchError> {
    let ocr = ocr_backend(config)?;
    let source = PdfiumSource::bind(config.pdfium_lib_path.as_deref(), config.password.clone())?;

    let mut runner = BatchRunner::new(config.clone(), &source, ocr.as_ref());
    if let Some(cb) = progress {
        runner = runner.with_progress(cb);
    }
    runner.run()
}

/// The OCR backend matching `config` and the enabled crate features.
pub fn ocr_backend(config: &BatchConfig) -> Result<Box<dyn OcrBackend>, BatchError> {
    if !config.extract_text {
        return Ok(Box::new(DisabledOcr));
    }

    #[cfg(feature = "tesseract")]
    let backend: Result<Box<dyn OcrBackend>, BatchError> = Ok(Box::new(
        crate::pipeline::ocr::TesseractBackend::new(config.tessdata_dir.clone()),
    ));

    #[cfg(not(feature = "tesseract"))]
    let backend: Result<Box<dyn OcrBackend>, BatchError> = Err(BatchError::InvalidConfig(
        "text extraction needs the `tesseract` feature, which this build \
         was compiled without; rebuild with default features or disable \
         text extraction"
            .into(),
    ));

    backend
}
