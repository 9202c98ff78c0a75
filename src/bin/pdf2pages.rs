//! CLI binary for pdf2pages.
//!
//! A thin shim over the library crate that maps CLI flags to `BatchConfig`,
//! runs the batch once, and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2pages::{convert_tree, BatchConfig, BatchProgressCallback, EngineScope, ProgressCallback};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner for the walk plus a per-document page bar.
/// The total number of documents is unknown until the walk ends, so the bar
/// tracks pages of the current document and a counter tracks documents.
struct CliProgressCallback {
    bar: ProgressBar,
    input_root: PathBuf,
    documents: AtomicUsize,
}

impl CliProgressCallback {
    fn new(input_root: &Path) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message(input_root.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            input_root: input_root.to_path_buf(),
            documents: AtomicUsize::new(0),
        })
    }

    fn short<'a>(&self, document: &'a Path) -> std::borrow::Cow<'a, str> {
        document
            .strip_prefix(&self.input_root)
            .unwrap_or(document)
            .to_string_lossy()
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_document_start(&self, document: &Path, page_count: usize) {
        let n = self.documents.fetch_add(1, Ordering::SeqCst) + 1;
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_style(style);
        self.bar.set_length(page_count as u64);
        self.bar.set_position(0);
        self.bar.set_prefix(format!("Doc {n}"));
        self.bar.set_message(self.short(document).into_owned());
        self.bar.reset_eta();
    }

    fn on_page_complete(&self, _document: &Path, _page_index: usize, _page_count: usize) {
        self.bar.inc(1);
    }

    fn on_page_error(&self, document: &Path, page_index: usize, _page_count: usize, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {} p_{}  {}",
            red("✗"),
            self.short(document),
            page_index,
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_document_complete(&self, document: &Path, pages_ok: usize, page_count: usize) {
        let mark = if pages_ok == page_count {
            green("✓")
        } else {
            cyan("⚠")
        };
        self.bar.println(format!(
            "  {} {}  {}",
            mark,
            self.short(document),
            dim(&format!("{pages_ok}/{page_count} pages"))
        ));
    }

    fn on_document_error(&self, document: &Path, error: &str) {
        self.bar
            .println(format!("  {} {}  {}", red("✗"), self.short(document), red(error)));
    }

    fn on_document_skipped(&self, document: &Path, reason: &str) {
        self.bar
            .println(format!("  {} {}  {}", dim("–"), self.short(document), dim(reason)));
    }

    fn on_run_complete(&self, _documents: usize, _documents_failed: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a tree with defaults (150 DPI, 700 px wide, quality 75, eng)
  pdf2pages ./pdfs ./pages

  # Higher resolution output, one OCR engine for the whole run
  pdf2pages ./pdfs ./pages --dpi 200 --width 1000 --engine-scope per-run

  # Images only (no OCR)
  pdf2pages ./pdfs ./pages --no-ocr

  # JSON report on stdout
  pdf2pages ./pdfs ./pages --json > report.json

OUTPUT LAYOUT:
  input/a/b/c.pdf  →  output/a/b/c/p_0.webp, p_0.txt, p_1.webp, p_1.txt, …
  Page indices are 0-based.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH    Directory containing libpdfium
  TESSDATA_PREFIX    Tesseract model directory (used when --tessdata is unset)
  RUST_LOG           Override the log filter (e.g. pdf2pages=debug)
"#;

/// Convert a tree of PDFs into per-page WebP images and OCR text.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2pages",
    version,
    about = "Convert a tree of PDFs into per-page WebP images and OCR text",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory scanned recursively for *.pdf files.
    input_root: PathBuf,

    /// Directory receiving one subdirectory per document.
    output_root: PathBuf,

    /// Rendering DPI.
    #[arg(long, env = "PDF2PAGES_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(1..=1200))]
    dpi: u32,

    /// Output image width in pixels (height follows the aspect ratio).
    #[arg(long, env = "PDF2PAGES_WIDTH", default_value_t = 700,
          value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// WebP quality (0–100).
    #[arg(long, env = "PDF2PAGES_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u32).range(0..=100))]
    quality: u32,

    /// Tesseract language model.
    #[arg(long, env = "PDF2PAGES_LANG", default_value = "eng")]
    lang: String,

    /// OCR engine lifetime.
    #[arg(long, env = "PDF2PAGES_ENGINE_SCOPE", value_enum, default_value = "per-document")]
    engine_scope: EngineScopeArg,

    /// Skip text extraction; write images only.
    #[arg(long, env = "PDF2PAGES_NO_OCR")]
    no_ocr: bool,

    /// Directory containing <lang>.traineddata.
    #[arg(long, env = "TESSDATA_PREFIX")]
    tessdata: Option<PathBuf>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// User password for encrypted PDFs.
    #[arg(long, env = "PDF2PAGES_PASSWORD")]
    password: Option<String>,

    /// Print the full JSON report on stdout.
    #[arg(long, env = "PDF2PAGES_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PAGES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PAGES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PAGES_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EngineScopeArg {
    PerDocument,
    PerRun,
}

impl From<EngineScopeArg> for EngineScope {
    fn from(v: EngineScopeArg) -> Self {
        match v {
            EngineScopeArg::PerDocument => EngineScope::PerDocument,
            EngineScopeArg::PerRun => EngineScope::PerRun,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // With the progress bar active only warnings are logged; the bar covers
    // the rest.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(&config.input_root) as ProgressCallback)
    } else {
        None
    };

    let report = convert_tree(&config, progress).context("Batch conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    }

    if !cli.quiet {
        let s = &report.stats;
        let mark = if s.documents_failed == 0 && s.pages_failed == 0 && s.artifacts_failed == 0 {
            green("✔")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{}  {}/{} documents  {} pages  {}ms  →  {}",
            mark,
            s.documents_completed,
            s.documents_found,
            s.pages_total,
            s.total_duration_ms,
            bold(&config.output_root.display().to_string()),
        );
        eprintln!(
            "   {} images  /  {} texts  /  {} page failures  /  {} artifact failures",
            dim(&s.images_written.to_string()),
            dim(&s.texts_written.to_string()),
            dim(&s.pages_failed.to_string()),
            dim(&s.artifacts_failed.to_string()),
        );
        if s.documents_skipped > 0 {
            eprintln!("   {} documents skipped", dim(&s.documents_skipped.to_string()));
        }
        for dir in &report.unreadable_dirs {
            eprintln!("   {} could not read {}", red("✗"), dir.display());
        }
    }

    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .input_root(&cli.input_root)
        .output_root(&cli.output_root)
        .dpi(cli.dpi)
        .target_width(cli.width)
        .quality(cli.quality)
        .language(&cli.lang)
        .engine_scope(cli.engine_scope.clone().into())
        .extract_text(!cli.no_ocr);

    if let Some(ref dir) = cli.tessdata {
        builder = builder.tessdata_dir(dir);
    }
    if let Some(ref dir) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(dir);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }

    builder.build().context("Invalid configuration")
}
