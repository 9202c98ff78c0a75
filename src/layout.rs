//! Output placement: where each document's page artifacts go.
//!
//! A document at `input_root/a/b/c.pdf` gets the directory
//! `output_root/a/b/c/`, holding `p_<i>.webp` and `p_<i>.txt` for every page
//! index `i`. Page indices are 0-based: the first page is `p_0`.

use crate::error::StageError;
use crate::pipeline::encode::{write_atomic, IMAGE_EXTENSION};
use std::path::{Path, PathBuf};

/// The two artifact paths of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub image: PathBuf,
    pub text: PathBuf,
}

/// Output directory for `document`, mirroring its location below `input_root`.
pub fn layout_for(
    input_root: &Path,
    document: &Path,
    output_root: &Path,
) -> Result<PathBuf, StageError> {
    let layout_err = |detail: String| StageError::Layout {
        path: document.to_path_buf(),
        detail,
    };

    let relative = document.strip_prefix(input_root).map_err(|_| {
        layout_err(format!("not below input root '{}'", input_root.display()))
    })?;
    let stem = relative
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| layout_err("document has no file name".into()))?;

    let mut dir = output_root.to_path_buf();
    if let Some(parent) = relative.parent() {
        dir.push(parent);
    }
    dir.push(stem);
    Ok(dir)
}

/// Create `dir` and all of its ancestors.
pub fn ensure_layout(dir: &Path) -> Result<(), StageError> {
    std::fs::create_dir_all(dir).map_err(|e| StageError::Layout {
        path: dir.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Artifact paths for page `page_index` inside `dir`.
pub fn artifact_paths(dir: &Path, page_index: usize) -> ArtifactPaths {
    ArtifactPaths {
        image: dir.join(format!("p_{page_index}.{IMAGE_EXTENSION}")),
        text: dir.join(format!("p_{page_index}.txt")),
    }
}

/// Write a UTF-8 text artifact via temp file + rename.
pub fn write_text_atomic(path: &Path, text: &str) -> Result<(), StageError> {
    write_atomic(path, text.as_bytes()).map_err(|e| StageError::TextWrite {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
