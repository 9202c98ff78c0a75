//! Image encoding: `ResizedPage` → lossy WebP file on disk.
//!
//! WebP is the single output codec. The file is written to a temporary
//! sibling and renamed into place, so a crash mid-write never leaves a
//! truncated `p_<i>.webp` behind.

use crate::config::Quality;
use crate::error::StageError;
use crate::pipeline::raster::ResizedPage;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;
use webp::Encoder as WebPEncoder;

/// File extension of the image artifacts.
pub const IMAGE_EXTENSION: &str = "webp";

/// Encode `page` as lossy WebP bytes at `quality` (0 = smallest file).
pub fn encode_webp_bytes(page: &ResizedPage, quality: Quality) -> Result<Vec<u8>, String> {
    let rgba = page.raster().to_rgba_image();
    let memory = WebPEncoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, f32::from(quality.get()))
        .map_err(|e| format!("{:?}", e))?;
    Ok(memory.to_vec())
}

/// Encode `page` and write it to `path`.
///
/// The parent directory must already exist; it is not created here.
pub fn encode_webp(page: &ResizedPage, path: &Path, quality: Quality) -> Result<(), StageError> {
    let encode_err = |detail: String| StageError::Encode {
        path: path.to_path_buf(),
        detail,
    };

    let bytes = encode_webp_bytes(page, quality).map_err(encode_err)?;
    write_atomic(path, &bytes).map_err(|e| encode_err(e.to_string()))?;

    debug!(
        "Encoded {}x{} page → {} ({} bytes, q={})",
        page.width(),
        page.height(),
        path.display(),
        bytes.len(),
        quality
    );
    Ok(())
}

/// Write `bytes` to `path` via a temporary file in the same directory.
///
/// The temporary file is created with the mode a plain `File::create` would
/// get (0666 minus the umask), so the renamed artifact is not owner-only.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "artifact path has no parent")
    })?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(".p2p-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let tmp = builder.tempfile_in(dir)?;
    {
        let mut w = BufWriter::new(tmp.as_file());
        w.write_all(bytes)?;
        w.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
