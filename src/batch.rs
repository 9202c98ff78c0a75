//! Batch orchestration: walk the input tree and drive every pipeline stage.
//!
//! ## State machine
//!
//! ```text
//! document:  Pending ─▶ Placing ─┬─▶ Failed (output directory already claimed)
//!                                └─▶ Opening ─┬─▶ Failed (logged, skipped)
//!                                             ├─▶ Skipped (no pages)
//!                                             └─▶ Opened ─▶ PageLoop ─▶ Done
//!
//! page:      Rendering ─┬─▶ RenderFailed (logged, next page)
//!                       └─▶ Rendered ─▶ Resized ─┬─▶ Encoding   ─▶ p_<i>.webp
//!                                                └─▶ Extracting ─▶ p_<i>.txt
//! ```
//!
//! A failed page never aborts its document, a failed document never aborts
//! the run, and a failed artifact never aborts its sibling. Everything is
//! sequential: documents in walk order, pages in ascending index order, one
//! OCR engine in use at a time.
//!
//! `.pdf` is matched in any letter case, so `a.pdf` and `a.PDF` in one
//! directory map to the same output directory. The first document claims
//! it; later ones fail with [`StageError::Layout`] instead of overwriting
//! its artifacts.

use crate::config::{BatchConfig, EngineScope};
use crate::error::{BatchError, StageError};
use crate::layout::{artifact_paths, ensure_layout, layout_for, write_text_atomic};
use crate::pipeline::encode::encode_webp;
use crate::pipeline::input::discover;
use crate::pipeline::ocr::{OcrBackend, OcrEngine};
use crate::pipeline::source::{Document, DocumentSource};
use crate::pipeline::transform::resize_to_width;
use crate::progress::ProgressCallback;
use crate::report::{
    ArtifactStatus, BatchReport, BatchStats, DocumentOutcome, DocumentReport, PageOutcome,
    PageReport,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

type Engine = Box<dyn OcrEngine>;

/// Output directory → document that claimed it.
type Claims = HashMap<PathBuf, PathBuf>;

/// Drives one batch run over an input tree.
///
/// The runner is the only component that sees the whole configuration; the
/// document source and OCR backend are injected so tests can substitute
/// fakes.
pub struct BatchRunner<'a> {
    config: BatchConfig,
    source: &'a dyn DocumentSource,
    ocr: &'a dyn OcrBackend,
    progress: Option<ProgressCallback>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        config: BatchConfig,
        source: &'a dyn DocumentSource,
        ocr: &'a dyn OcrBackend,
    ) -> Self {
        Self {
            config,
            source,
            ocr,
            progress: None,
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, cb: ProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn wants_text(&self) -> bool {
        self.config.extract_text && self.ocr.enabled()
    }

    /// Process every PDF below the input root.
    ///
    /// # Errors
    /// Only setup failures are returned: an unreadable input root, an output
    /// root that cannot be created, or a run-wide OCR engine that fails to
    /// load. Per-document and per-page failures are recorded in the report.
    pub fn run(&self) -> Result<BatchReport, BatchError> {
        let start = Instant::now();
        let config = &self.config;

        let walk = discover(&config.input_root)?;
        std::fs::create_dir_all(&config.output_root).map_err(|source| {
            BatchError::OutputDirFailed {
                path: config.output_root.clone(),
                source,
            }
        })?;

        info!(
            "Starting batch: {} → {} (dpi={}, width={}, quality={}, ocr={})",
            config.input_root.display(),
            config.output_root.display(),
            config.dpi,
            config.target_width,
            config.quality,
            if self.wants_text() {
                config.language.as_str()
            } else {
                "off"
            }
        );
        if let Some(ref cb) = self.progress {
            cb.on_run_start(&config.input_root);
        }

        let mut run_engine: Option<Engine> = None;
        if self.wants_text() && config.engine_scope == EngineScope::PerRun {
            let engine = self.ocr.acquire(&config.language).map_err(|e| {
                error!("{}", e);
                BatchError::EngineInit {
                    language: config.language.clone(),
                    detail: e.to_string(),
                }
            })?;
            run_engine = Some(engine);
        }

        let mut report = BatchReport::default();
        let mut claims = Claims::new();
        for item in walk {
            match item {
                Ok(path) => {
                    let doc = self.process_document(&path, run_engine.as_mut(), &mut claims);
                    report.documents.push(doc);
                }
                Err(BatchError::DirectoryUnreadable { path, source }) => {
                    warn!("Skipping unreadable directory {}: {}", path.display(), source);
                    report.unreadable_dirs.push(path);
                }
                Err(e) => warn!("Skipping input entry: {}", e),
            }
        }

        if run_engine.take().is_some() {
            debug!("Run-wide OCR engine released");
        }

        report.stats = BatchStats {
            total_duration_ms: start.elapsed().as_millis() as u64,
            ..BatchStats::from_documents(&report.documents)
        };
        info!(
            "Batch complete: {}/{} documents, {} pages ({} failed), {}ms",
            report.stats.documents_completed,
            report.stats.documents_found,
            report.stats.pages_total,
            report.stats.pages_failed,
            report.stats.total_duration_ms
        );
        if let Some(ref cb) = self.progress {
            cb.on_run_complete(report.stats.documents_found, report.stats.documents_failed);
        }

        Ok(report)
    }

    /// Open one document and process all of its pages.
    fn process_document(
        &self,
        path: &Path,
        run_engine: Option<&mut Engine>,
        claims: &mut Claims,
    ) -> DocumentReport {
        info!("Processing PDF: {}", path.display());

        let output_dir =
            match layout_for(&self.config.input_root, path, &self.config.output_root) {
                Ok(dir) => dir,
                Err(e) => return self.document_failed(path, e),
            };
        if let Some(first) = claims.get(&output_dir) {
            let error = StageError::Layout {
                path: path.to_path_buf(),
                detail: format!(
                    "output directory '{}' already used by '{}'",
                    output_dir.display(),
                    first.display()
                ),
            };
            return self.document_failed(path, error);
        }

        let document = match self.source.open(path) {
            Ok(doc) => doc,
            Err(e) => return self.document_failed(path, e),
        };
        let page_count = document.page_count();
        if page_count == 0 {
            return self.document_skipped(path, "document has no pages");
        }

        // Per-document engines live exactly as long as this call.
        let mut doc_engine: Option<Engine> = None;
        let mut engine: Option<&mut Engine> = match run_engine {
            Some(shared) => Some(shared),
            None if self.wants_text() => match self.ocr.acquire(&self.config.language) {
                Ok(e) => {
                    doc_engine = Some(e);
                    doc_engine.as_mut()
                }
                Err(e) => return self.document_failed(path, e),
            },
            None => None,
        };

        // Nothing exists on disk for a document that stopped above.
        if let Err(e) = ensure_layout(&output_dir) {
            return self.document_failed(path, e);
        }
        claims.insert(output_dir.clone(), path.to_path_buf());

        if let Some(ref cb) = self.progress {
            cb.on_document_start(path, page_count);
        }

        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            let page = self.process_page(
                document.as_ref(),
                path,
                index,
                &output_dir,
                engine.as_deref_mut(),
            );

            if let Some(ref cb) = self.progress {
                match &page.outcome {
                    _ if page.is_complete() => cb.on_page_complete(path, index, page_count),
                    PageOutcome::Failed { error } => {
                        cb.on_page_error(path, index, page_count, &error.to_string())
                    }
                    PageOutcome::Done { image, text } => {
                        let msg = [image, text]
                            .into_iter()
                            .filter_map(|s| match s {
                                ArtifactStatus::Failed { error } => Some(error.to_string()),
                                _ => None,
                            })
                            .collect::<Vec<_>>()
                            .join("; ");
                        cb.on_page_error(path, index, page_count, &msg)
                    }
                }
            }
            pages.push(page);
        }

        drop(document);
        if doc_engine.take().is_some() {
            debug!("OCR engine for {} released", path.display());
        }

        let pages_ok = pages.iter().filter(|p| p.is_complete()).count();
        info!(
            "Finished {}: {}/{} pages complete",
            path.display(),
            pages_ok,
            page_count
        );
        if let Some(ref cb) = self.progress {
            cb.on_document_complete(path, pages_ok, page_count);
        }

        DocumentReport {
            path: path.to_path_buf(),
            output_dir: Some(output_dir),
            page_count,
            outcome: DocumentOutcome::Completed,
            pages,
        }
    }

    /// Render, resize, and write both artifacts of one page.
    fn process_page(
        &self,
        document: &dyn Document,
        path: &Path,
        index: usize,
        output_dir: &Path,
        engine: Option<&mut Engine>,
    ) -> PageReport {
        let failed = |error: StageError| {
            warn!("{}: page {}: {}", path.display(), index, error);
            PageReport {
                index,
                outcome: PageOutcome::Failed { error },
            }
        };

        let raster = match document.render_page(index, self.config.dpi) {
            Ok(r) => r,
            Err(e) => return failed(e),
        };
        let resized = match resize_to_width(raster, self.config.target_width, index) {
            Ok(r) => r,
            Err(e) => return failed(e),
        };

        let paths = artifact_paths(output_dir, index);

        let image = match encode_webp(&resized, &paths.image, self.config.quality) {
            Ok(()) => ArtifactStatus::Written { path: paths.image },
            Err(error) => {
                warn!("{}: page {}: {}", path.display(), index, error);
                ArtifactStatus::Failed { error }
            }
        };

        let text = match engine {
            None => ArtifactStatus::Skipped,
            Some(engine) => match engine
                .extract_text(&resized, index)
                .and_then(|text| write_text_atomic(&paths.text, &text))
            {
                Ok(()) => ArtifactStatus::Written { path: paths.text },
                Err(error) => {
                    warn!("{}: page {}: {}", path.display(), index, error);
                    ArtifactStatus::Failed { error }
                }
            },
        };

        debug!("{}: page {} done", path.display(), index);
        PageReport {
            index,
            outcome: PageOutcome::Done { image, text },
        }
    }

    fn document_failed(&self, path: &Path, error: StageError) -> DocumentReport {
        warn!("Skipping {}: {}", path.display(), error);
        if let Some(ref cb) = self.progress {
            cb.on_document_error(path, &error.to_string());
        }
        DocumentReport::failed(path.to_path_buf(), error)
    }

    fn document_skipped(&self, path: &Path, reason: &str) -> DocumentReport {
        info!("Skipping {}: {}", path.display(), reason);
        if let Some(ref cb) = self.progress {
            cb.on_document_skipped(path, reason);
        }
        DocumentReport::skipped(path.to_path_buf(), reason.to_string())
    }
}
