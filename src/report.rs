//! Per-run results: what was produced, what failed, and why.
//!
//! The orchestrator never aborts on a bad document or page; instead every
//! outcome lands in a [`BatchReport`]. The CLI prints it as JSON with
//! `--json` and derives its closing summary from [`BatchStats`].

use crate::error::StageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one artifact of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// The artifact was written under its final name.
    Written { path: PathBuf },
    /// Writing was attempted and failed; nothing exists under the final name.
    Failed { error: StageError },
    /// Not requested (e.g. text extraction disabled).
    Skipped,
}

impl ArtifactStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, ArtifactStatus::Written { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ArtifactStatus::Failed { .. })
    }
}

/// Outcome of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    /// Rendered and resized; each artifact has its own status.
    Done {
        image: ArtifactStatus,
        text: ArtifactStatus,
    },
    /// Rendering or resizing failed; no artifact was attempted.
    Failed { error: StageError },
}

/// Result for one page of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    /// 0-based page index, also used in the artifact names.
    pub index: usize,
    #[serde(flatten)]
    pub outcome: PageOutcome,
}

impl PageReport {
    /// Both requested artifacts exist.
    pub fn is_complete(&self) -> bool {
        match &self.outcome {
            PageOutcome::Done { image, text } => {
                image.is_written() && !text.is_failed()
            }
            PageOutcome::Failed { .. } => false,
        }
    }
}

/// Outcome of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// Every page was attempted (individual pages may still have failed).
    Completed,
    /// The document could not be processed at all.
    Failed { error: StageError },
    /// The document opened but there was nothing to produce.
    Skipped { reason: String },
}

/// Result for one discovered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Absolute or root-joined path of the source PDF.
    pub path: PathBuf,
    /// Directory holding this document's artifacts, once computed.
    pub output_dir: Option<PathBuf>,
    /// Page count reported by the document; 0 when it failed to open.
    pub page_count: usize,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
    pub pages: Vec<PageReport>,
}

impl DocumentReport {
    pub(crate) fn failed(path: PathBuf, error: StageError) -> Self {
        Self {
            path,
            output_dir: None,
            page_count: 0,
            outcome: DocumentOutcome::Failed { error },
            pages: Vec::new(),
        }
    }

    pub(crate) fn skipped(path: PathBuf, reason: String) -> Self {
        Self {
            path,
            output_dir: None,
            page_count: 0,
            outcome: DocumentOutcome::Skipped { reason },
            pages: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, DocumentOutcome::Failed { .. })
    }
}

/// Aggregate counters over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub documents_found: usize,
    pub documents_completed: usize,
    pub documents_failed: usize,
    pub documents_skipped: usize,
    pub pages_total: usize,
    pub pages_failed: usize,
    pub images_written: usize,
    pub texts_written: usize,
    pub artifacts_failed: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    /// Tally counters from per-document reports.
    pub fn from_documents(documents: &[DocumentReport]) -> Self {
        let mut stats = BatchStats {
            documents_found: documents.len(),
            ..Default::default()
        };
        for doc in documents {
            match doc.outcome {
                DocumentOutcome::Completed => stats.documents_completed += 1,
                DocumentOutcome::Failed { .. } => stats.documents_failed += 1,
                DocumentOutcome::Skipped { .. } => stats.documents_skipped += 1,
            }
            stats.pages_total += doc.page_count;
            for page in &doc.pages {
                match &page.outcome {
                    PageOutcome::Failed { .. } => stats.pages_failed += 1,
                    PageOutcome::Done { image, text } => {
                        for (status, written) in [
                            (image, &mut stats.images_written),
                            (text, &mut stats.texts_written),
                        ] {
                            match status {
                                ArtifactStatus::Written { .. } => *written += 1,
                                ArtifactStatus::Failed { .. } => stats.artifacts_failed += 1,
                                ArtifactStatus::Skipped => {}
                            }
                        }
                    }
                }
            }
        }
        stats
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    /// Subdirectories of the input root that could not be listed.
    pub unreadable_dirs: Vec<PathBuf>,
    pub stats: BatchStats,
}
