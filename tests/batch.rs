//! Orchestrator tests with in-memory document and OCR backends.
//!
//! Fixture "PDFs" are small text files understood by `FakeSource`:
//!
//! ```text
//! %PDF-fake
//! pages=3
//! size=200x300
//! render_fail=1
//! ```
//!
//! Anything without the `%PDF` header fails to open, like a corrupt file.

use pdf2pages::pipeline::source::check_pdf_header;
use pdf2pages::{
    ArtifactStatus, BatchConfig, BatchError, BatchProgressCallback, BatchRunner, DisabledOcr,
    Document, DocumentOutcome, DocumentSource, EngineScope, OcrBackend, OcrEngine, PageOutcome,
    RasterPage, ResizedPage, StageError,
};
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Fake document source ─────────────────────────────────────────────────────

struct FakeSource;

struct FakeDocument {
    pages: usize,
    width: u32,
    height: u32,
    render_fail: HashSet<usize>,
}

fn parse_list(v: &str) -> HashSet<usize> {
    v.split(',').filter_map(|s| s.trim().parse().ok()).collect()
}

impl DocumentSource for FakeSource {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn Document + 'a>, StageError> {
        check_pdf_header(path)?;
        let body = fs::read_to_string(path).map_err(|e| StageError::DocumentLoad {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        let mut doc = FakeDocument {
            pages: 1,
            width: 200,
            height: 300,
            render_fail: HashSet::new(),
        };
        for line in body.lines().skip(1) {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "pages" => doc.pages = value.trim().parse().unwrap_or(0),
                "size" => {
                    if let Some((w, h)) = value.trim().split_once('x') {
                        doc.width = w.parse().unwrap_or(1);
                        doc.height = h.parse().unwrap_or(1);
                    }
                }
                "render_fail" => doc.render_fail = parse_list(value),
                _ => {}
            }
        }
        Ok(Box::new(doc))
    }
}

impl Document for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, index: usize, _dpi: u32) -> Result<RasterPage, StageError> {
        if index >= self.pages || self.render_fail.contains(&index) {
            return Err(StageError::PageRender {
                page: index,
                detail: "injected render failure".into(),
            });
        }
        let shade = (index * 40 % 255) as u8;
        let img = RgbaImage::from_pixel(self.width, self.height, Rgba([shade, 128, 255, 255]));
        RasterPage::from_rgba(img).map_err(|e| StageError::PageRender {
            page: index,
            detail: e.to_string(),
        })
    }
}

// ── Fake OCR backend ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
    calls: AtomicUsize,
}

struct FakeOcr {
    counters: Arc<Counters>,
    fail_init: bool,
    fail_pages: HashSet<usize>,
}

impl FakeOcr {
    fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            fail_init: false,
            fail_pages: HashSet::new(),
        }
    }
}

impl OcrBackend for FakeOcr {
    fn acquire(&self, language: &str) -> Result<Box<dyn OcrEngine>, StageError> {
        if self.fail_init {
            return Err(StageError::EngineInit {
                language: language.to_string(),
                detail: "traineddata missing".into(),
            });
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeEngine {
            counters: Arc::clone(&self.counters),
            fail_pages: self.fail_pages.clone(),
        }))
    }
}

struct FakeEngine {
    counters: Arc<Counters>,
    fail_pages: HashSet<usize>,
}

impl OcrEngine for FakeEngine {
    fn extract_text(&mut self, page: &ResizedPage, page_index: usize) -> Result<String, StageError> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pages.contains(&page_index) {
            return Err(StageError::OcrExtraction {
                page: page_index,
                detail: "injected ocr failure".into(),
            });
        }
        Ok(format!("page {page_index} {}x{}", page.width(), page.height()))
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Fixture {
    _tmp: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        fs::create_dir_all(&input).unwrap();
        Self {
            _tmp: tmp,
            input,
            output,
        }
    }

    fn pdf(&self, rel: &str, body: &str) -> &Self {
        let p = self.input.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, format!("%PDF-fake\n{body}\n")).unwrap();
        self
    }

    fn raw(&self, rel: &str, bytes: &[u8]) -> &Self {
        let p = self.input.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, bytes).unwrap();
        self
    }

    fn config(&self) -> BatchConfig {
        BatchConfig::builder()
            .input_root(&self.input)
            .output_root(&self.output)
            .target_width(100)
            .quality(80)
            .build()
            .unwrap()
    }

    /// Sorted file names inside `output/<rel>`.
    fn artifacts(&self, rel: &str) -> Vec<String> {
        let dir = self.output.join(rel);
        let mut names: Vec<String> = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

fn names(pairs: &[usize]) -> Vec<String> {
    let mut v: Vec<String> = pairs
        .iter()
        .flat_map(|i| [format!("p_{i}.webp"), format!("p_{i}.txt")])
        .collect();
    v.sort();
    v
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn every_page_gets_exactly_one_artifact_pair() {
    let fx = Fixture::new();
    fx.pdf("doc.pdf", "pages=4");
    let ocr = FakeOcr::new();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    assert_eq!(fx.artifacts("doc"), names(&[0, 1, 2, 3]));
    assert_eq!(report.stats.pages_total, 4);
    assert_eq!(report.stats.images_written, 4);
    assert_eq!(report.stats.texts_written, 4);
    assert!(!fx.output.join("doc/p_4.webp").exists());

    let text = fs::read_to_string(fx.output.join("doc/p_2.txt")).unwrap();
    assert_eq!(text, "page 2 100x150");
}

#[test]
fn images_are_resized_webps() {
    let fx = Fixture::new();
    fx.pdf("doc.pdf", "pages=1\nsize=1275x1650");
    let ocr = FakeOcr::new();

    BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    let img = image::open(fx.output.join("doc/p_0.webp")).expect("valid webp");
    // round(100 * 1650 / 1275) = 129
    assert_eq!((img.width(), img.height()), (100, 129));
}

#[test]
fn output_mirrors_input_structure() {
    let fx = Fixture::new();
    fx.pdf("a/b/c.pdf", "pages=1").pdf("top.PDF", "pages=2");
    let ocr = FakeOcr::new();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    assert_eq!(fx.artifacts("a/b/c"), names(&[0]));
    assert_eq!(fx.artifacts("top"), names(&[0, 1]));
    let dirs: Vec<_> = report
        .documents
        .iter()
        .map(|d| d.output_dir.clone().unwrap())
        .collect();
    assert_eq!(dirs, vec![fx.output.join("a/b/c"), fx.output.join("top")]);
}

#[test]
fn corrupt_document_does_not_reduce_valid_output() {
    let fx = Fixture::new();
    fx.pdf("one.pdf", "pages=2")
        .raw("broken.pdf", b"\x00\x01garbage")
        .pdf("two.pdf", "pages=3");
    let ocr = FakeOcr::new();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    assert_eq!(fx.artifacts("one"), names(&[0, 1]));
    assert_eq!(fx.artifacts("two"), names(&[0, 1, 2]));
    assert!(!fx.output.join("broken").exists(), "no directory for a failed open");

    assert_eq!(report.stats.documents_found, 3);
    assert_eq!(report.stats.documents_failed, 1);
    let broken = report
        .documents
        .iter()
        .find(|d| d.path.ends_with("broken.pdf"))
        .unwrap();
    assert!(matches!(
        broken.outcome,
        DocumentOutcome::Failed {
            error: StageError::DocumentLoad { .. }
        }
    ));
}

#[test]
fn failing_page_does_not_abort_document() {
    let fx = Fixture::new();
    fx.pdf("doc.pdf", "pages=4\nrender_fail=1");
    let ocr = FakeOcr::new();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    assert_eq!(fx.artifacts("doc"), names(&[0, 2, 3]));
    let doc = &report.documents[0];
    assert_eq!(doc.outcome, DocumentOutcome::Completed);
    assert_eq!(doc.pages.len(), 4);
    assert!(matches!(
        doc.pages[1].outcome,
        PageOutcome::Failed {
            error: StageError::PageRender { page: 1, .. }
        }
    ));
    assert_eq!(report.stats.pages_failed, 1);
}

#[test]
fn ocr_failure_keeps_the_image() {
    let fx = Fixture::new();
    fx.pdf("doc.pdf", "pages=3");
    let mut ocr = FakeOcr::new();
    ocr.fail_pages = [1].into_iter().collect();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    assert!(fx.output.join("doc/p_1.webp").exists());
    assert!(!fx.output.join("doc/p_1.txt").exists());
    match &report.documents[0].pages[1].outcome {
        PageOutcome::Done { image, text } => {
            assert!(image.is_written());
            assert!(matches!(
                text,
                ArtifactStatus::Failed {
                    error: StageError::OcrExtraction { page: 1, .. }
                }
            ));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(report.stats.artifacts_failed, 1);
    assert_eq!(report.stats.texts_written, 2);
}

#[test]
fn per_document_engines_are_released_once_each() {
    let fx = Fixture::new();
    fx.pdf("a.pdf", "pages=2")
        .pdf("b.pdf", "pages=1")
        .raw("c.pdf", b"nope");
    let ocr = FakeOcr::new();

    BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    let c = &ocr.counters;
    assert_eq!(c.acquired.load(Ordering::SeqCst), 2, "one engine per opened document");
    assert_eq!(c.released.load(Ordering::SeqCst), 2);
    assert_eq!(c.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn per_run_engine_is_shared_and_released_once() {
    let fx = Fixture::new();
    fx.pdf("a.pdf", "pages=2").pdf("b.pdf", "pages=2");
    let ocr = FakeOcr::new();
    let config = BatchConfig {
        engine_scope: EngineScope::PerRun,
        ..fx.config()
    };

    BatchRunner::new(config, &FakeSource, &ocr).run().unwrap();

    let c = &ocr.counters;
    assert_eq!(c.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(c.released.load(Ordering::SeqCst), 1);
    assert_eq!(c.calls.load(Ordering::SeqCst), 4);
}

#[test]
fn per_document_engine_init_failure_skips_documents_without_crashing() {
    let fx = Fixture::new();
    fx.pdf("a.pdf", "pages=2").pdf("b.pdf", "pages=1");
    let mut ocr = FakeOcr::new();
    ocr.fail_init = true;

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    assert_eq!(report.stats.documents_failed, 2);
    assert_eq!(report.stats.images_written, 0);
    assert!(!fx.output.join("a").exists(), "no directory without an engine");
    assert!(!fx.output.join("b").exists());
    for doc in &report.documents {
        assert!(matches!(
            doc.outcome,
            DocumentOutcome::Failed {
                error: StageError::EngineInit { .. }
            }
        ));
    }
}

#[test]
fn per_run_engine_init_failure_is_fatal_for_the_run() {
    let fx = Fixture::new();
    fx.pdf("a.pdf", "pages=1");
    let mut ocr = FakeOcr::new();
    ocr.fail_init = true;
    let config = BatchConfig {
        engine_scope: EngineScope::PerRun,
        ..fx.config()
    };

    let err = BatchRunner::new(config, &FakeSource, &ocr).run().unwrap_err();
    assert!(matches!(err, BatchError::EngineInit { ref language, .. } if language == "eng"));
    assert!(fx.artifacts("a").is_empty());
}

#[test]
fn disabled_text_extraction_writes_images_only() {
    let fx = Fixture::new();
    fx.pdf("doc.pdf", "pages=2");
    let config = BatchConfig {
        extract_text: false,
        ..fx.config()
    };

    let report = BatchRunner::new(config, &FakeSource, &DisabledOcr).run().unwrap();

    assert_eq!(fx.artifacts("doc"), vec!["p_0.webp", "p_1.webp"]);
    assert_eq!(report.stats.texts_written, 0);
    assert!(report.documents[0].pages.iter().all(|p| p.is_complete()));
}

#[test]
fn zero_page_document_is_skipped_without_a_directory() {
    let fx = Fixture::new();
    fx.pdf("empty.pdf", "pages=0").pdf("full.pdf", "pages=1");
    let ocr = FakeOcr::new();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    assert!(matches!(
        report.documents[0].outcome,
        DocumentOutcome::Skipped { ref reason } if reason.contains("no pages")
    ));
    assert!(!fx.output.join("empty").exists());
    assert_eq!(ocr.counters.acquired.load(Ordering::SeqCst), 1, "no engine for an empty document");
    assert_eq!(report.stats.documents_skipped, 1);
    assert_eq!(report.stats.documents_completed, 1);
    assert_eq!(report.stats.documents_failed, 0);
}

#[test]
fn documents_differing_only_in_extension_case_do_not_overwrite() {
    let fx = Fixture::new();
    fx.pdf("a.pdf", "pages=3").pdf("a.PDF", "pages=1");
    if fs::read_dir(&fx.input).unwrap().count() < 2 {
        println!("SKIP — case-insensitive file system");
        return;
    }
    let ocr = FakeOcr::new();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();

    // Walk order is byte order: `a.PDF` sorts first and claims `out/a`.
    assert_eq!(fx.artifacts("a"), names(&[0]));
    assert_eq!(report.stats.images_written, 1);
    assert_eq!(report.stats.documents_failed, 1);

    let loser = &report.documents[1];
    assert!(loser.path.ends_with("a.pdf"));
    match &loser.outcome {
        DocumentOutcome::Failed {
            error: StageError::Layout { detail, .. },
        } => assert!(detail.contains("a.PDF"), "got: {detail}"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_is_reported_and_walk_continues() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new();
    fx.pdf("one.pdf", "pages=1")
        .pdf("locked/two.pdf", "pages=1")
        .pdf("z.pdf", "pages=1");
    let locked = fx.input.join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // Running with CAP_DAC_OVERRIDE (e.g. as root).
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        println!("SKIP — permissions are not enforced for this user");
        return;
    }
    let ocr = FakeOcr::new();

    let result = BatchRunner::new(fx.config(), &FakeSource, &ocr).run();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let report = result.unwrap();

    assert_eq!(report.unreadable_dirs, vec![locked]);
    assert_eq!(report.stats.documents_found, 2);
    assert_eq!(fx.artifacts("one"), names(&[0]));
    assert_eq!(fx.artifacts("z"), names(&[0]));
}

#[test]
fn non_pdf_files_are_ignored() {
    let fx = Fixture::new();
    fx.pdf("doc.pdf", "pages=1")
        .raw("notes.txt", b"%PDF but not really")
        .raw("scan.pdf.bak", b"%PDF-1.4");
    let ocr = FakeOcr::new();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();
    assert_eq!(report.stats.documents_found, 1);
}

#[test]
fn missing_input_root_is_fatal() {
    let fx = Fixture::new();
    let config = BatchConfig {
        input_root: fx.input.join("does-not-exist"),
        ..fx.config()
    };
    let ocr = FakeOcr::new();

    let err = BatchRunner::new(config, &FakeSource, &ocr).run().unwrap_err();
    assert!(err.is_input_error());
    assert!(!fx.output.exists(), "nothing is created before the root is validated");
}

#[test]
fn progress_events_follow_the_run() {
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl BatchProgressCallback for Recorder {
        fn on_run_start(&self, _root: &Path) {
            self.events.lock().unwrap().push("run".into());
        }
        fn on_document_start(&self, _d: &Path, n: usize) {
            self.events.lock().unwrap().push(format!("doc:{n}"));
        }
        fn on_page_complete(&self, _d: &Path, i: usize, _n: usize) {
            self.events.lock().unwrap().push(format!("ok:{i}"));
        }
        fn on_page_error(&self, _d: &Path, i: usize, _n: usize, _e: &str) {
            self.events.lock().unwrap().push(format!("err:{i}"));
        }
        fn on_document_complete(&self, _d: &Path, ok: usize, n: usize) {
            self.events.lock().unwrap().push(format!("done:{ok}/{n}"));
        }
        fn on_document_error(&self, _d: &Path, _e: &str) {
            self.events.lock().unwrap().push("doc-error".into());
        }
        fn on_run_complete(&self, docs: usize, failed: usize) {
            self.events.lock().unwrap().push(format!("end:{docs}/{failed}"));
        }
    }

    let fx = Fixture::new();
    fx.pdf("a.pdf", "pages=3\nrender_fail=1").raw("b.pdf", b"junk");
    let ocr = FakeOcr::new();
    let recorder = Arc::new(Recorder::default());

    BatchRunner::new(fx.config(), &FakeSource, &ocr)
        .with_progress(recorder.clone())
        .run()
        .unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "run", "doc:3", "ok:0", "err:1", "ok:2", "done:2/3", "doc-error", "end:2/1"
        ]
    );
}

#[test]
fn report_round_trips_through_json() {
    let fx = Fixture::new();
    fx.pdf("doc.pdf", "pages=2\nrender_fail=0");
    let ocr = FakeOcr::new();

    let report = BatchRunner::new(fx.config(), &FakeSource, &ocr).run().unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let back: pdf2pages::BatchReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.documents, report.documents);
}
