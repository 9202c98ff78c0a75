//! Configuration types for a batch run.
//!
//! Every knob lives in [`BatchConfig`], built via [`BatchConfigBuilder`].
//! Validation happens once in [`BatchConfigBuilder::build`], so the pipeline
//! stages never see a zero width or an out-of-range quality.

use crate::error::BatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lowest accepted rendering DPI.
pub const MIN_DPI: u32 = 1;
/// Highest accepted rendering DPI.
pub const MAX_DPI: u32 = 1200;

/// Configuration for one batch run.
///
/// # Example
/// ```rust
/// use pdf2pages::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .input_root("pdfs")
///     .output_root("pages")
///     .dpi(150)
///     .target_width(700)
///     .quality(75)
///     .build()
///     .unwrap();
/// assert_eq!(config.quality.get(), 75);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory scanned recursively for `*.pdf` files.
    pub input_root: PathBuf,

    /// Directory receiving one subdirectory per document.
    pub output_root: PathBuf,

    /// Rendering DPI applied to both axes. Default: 150.
    pub dpi: u32,

    /// Width in pixels of every output image. Height follows the page's
    /// aspect ratio. Default: 700.
    pub target_width: u32,

    /// Lossy WebP quality. Default: 75.
    pub quality: Quality,

    /// Tesseract language model identifier. Default: `"eng"`.
    pub language: String,

    /// How long one OCR engine lives. Default: [`EngineScope::PerDocument`].
    pub engine_scope: EngineScope,

    /// Write `p_<i>.txt` artifacts. Default: true.
    pub extract_text: bool,

    /// Directory containing the pdfium shared library. When `None` the
    /// working directory and then the system library path are tried.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Directory containing `<language>.traineddata`. When `None` the
    /// engine's compiled-in default location is used.
    pub tessdata_dir: Option<PathBuf>,

    /// User password applied to every encrypted document.
    pub password: Option<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("."),
            output_root: PathBuf::from("out"),
            dpi: 150,
            target_width: 700,
            quality: Quality::DEFAULT,
            language: "eng".to_string(),
            engine_scope: EngineScope::default(),
            extract_text: true,
            pdfium_lib_path: None,
            tessdata_dir: None,
            password: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("input_root", &self.input_root)
            .field("output_root", &self.output_root)
            .field("dpi", &self.dpi)
            .field("target_width", &self.target_width)
            .field("quality", &self.quality)
            .field("language", &self.language)
            .field("engine_scope", &self.engine_scope)
            .field("extract_text", &self.extract_text)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("tessdata_dir", &self.tessdata_dir)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
            quality: u32::from(Quality::DEFAULT.get()),
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
    // Raw value; range-checked in `build`.
    quality: u32,
}

impl BatchConfigBuilder {
    pub fn input_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_root = path.into();
        self
    }

    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_root = path.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn target_width(mut self, px: u32) -> Self {
        self.config.target_width = px;
        self
    }

    pub fn quality(mut self, q: u32) -> Self {
        self.quality = q;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn engine_scope(mut self, scope: EngineScope) -> Self {
        self.config.engine_scope = scope;
        self
    }

    pub fn extract_text(mut self, v: bool) -> Self {
        self.config.extract_text = v;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn tessdata_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tessdata_dir = Some(path.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<BatchConfig, BatchError> {
        let c = &self.config;
        if !(MIN_DPI..=MAX_DPI).contains(&c.dpi) {
            return Err(BatchError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c.target_width == 0 {
            return Err(BatchError::InvalidConfig(
                "Target width must be ≥ 1 pixel".into(),
            ));
        }
        if c.language.trim().is_empty() {
            return Err(BatchError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        self.config.quality = Quality::new(self.quality)?;
        Ok(self.config)
    }
}

// ── Value types ──────────────────────────────────────────────────────────

/// Lossy compression quality in `0..=100`.
///
/// Out-of-range values are rejected rather than clamped, so a typo such as
/// `--quality 750` surfaces before any document is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u32 = 100;
    pub const DEFAULT: Quality = Quality(75);

    /// Validate a raw quality value.
    pub fn new(q: u32) -> Result<Self, BatchError> {
        if q > Self::MAX {
            return Err(BatchError::InvalidConfig(format!(
                "Quality must be 0–{}, got {q}",
                Self::MAX
            )));
        }
        Ok(Quality(q as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Quality {
    type Error = BatchError;

    fn try_from(q: u32) -> Result<Self, Self::Error> {
        Quality::new(q)
    }
}

impl From<Quality> for u32 {
    fn from(q: Quality) -> Self {
        u32::from(q.0)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifetime of one OCR engine instance.
///
/// A per-document engine confines a corrupted engine state to the document
/// that caused it; a per-run engine skips the model load for every document
/// after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineScope {
    /// A fresh engine for every document (default).
    #[default]
    PerDocument,
    /// One engine shared by every document of the run.
    PerRun,
}
