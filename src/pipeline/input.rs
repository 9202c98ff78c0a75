//! Input discovery: lazily walk the input root for PDF documents.
//!
//! [`discover`] validates the root up front (an unreadable root is the one
//! input failure that aborts a run) and returns a [`PdfWalk`] iterator. The
//! walk is depth-first with entries sorted by name inside each directory, so
//! two runs over the same tree visit documents in the same order. Calling
//! `discover` again restarts from the root.
//!
//! Subdirectories that cannot be listed show up as `Err` items; the
//! orchestrator logs them and keeps walking. Symlinked directories are not
//! followed, which rules out cycles. Symlinked files are followed.

use crate::error::BatchError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether `path` has a `.pdf` extension, in any letter case.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Start a walk over `root`.
pub fn discover(root: &Path) -> Result<PdfWalk, BatchError> {
    let unreadable = |source: std::io::Error| BatchError::InputRootUnreadable {
        path: root.to_path_buf(),
        source,
    };

    let meta = fs::metadata(root).map_err(unreadable)?;
    if !meta.is_dir() {
        return Err(unreadable(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a directory",
        )));
    }
    let children = sorted_children(root).map_err(unreadable)?;

    let mut stack = children;
    stack.reverse();
    Ok(PdfWalk { stack })
}

/// Lazy depth-first iterator over the PDF files below a root.
#[derive(Debug)]
pub struct PdfWalk {
    // Paths still to examine; popped from the end.
    stack: Vec<PathBuf>,
}

impl Iterator for PdfWalk {
    type Item = Result<PathBuf, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(path) = self.stack.pop() {
            let Ok(meta) = fs::symlink_metadata(&path) else {
                // Vanished between listing and visiting.
                continue;
            };
            let file_type = meta.file_type();

            if file_type.is_dir() {
                match sorted_children(&path) {
                    Ok(mut children) => {
                        children.reverse();
                        self.stack.extend(children);
                    }
                    Err(source) => {
                        return Some(Err(BatchError::DirectoryUnreadable { path, source }));
                    }
                }
                continue;
            }

            if !is_pdf_path(&path) {
                continue;
            }

            let is_file = if file_type.is_symlink() {
                fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false)
            } else {
                file_type.is_file()
            };
            if is_file {
                debug!("Discovered {}", path.display());
                return Some(Ok(path));
            }
        }
        None
    }
}

fn sorted_children(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut children = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    children.sort();
    Ok(children)
}
