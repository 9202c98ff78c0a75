//! Resize a rendered page to the configured output width.

use crate::error::StageError;
use crate::pipeline::raster::{RasterPage, ResizedPage};
use image::imageops::{self, FilterType};
use tracing::debug;

/// Height that keeps the aspect ratio of a `width`×`height` page when scaled
/// to `target_width`: `round(target_width * height / width)`, at least 1.
///
/// Returns `None` when either width is zero.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> Option<u32> {
    if width == 0 || target_width == 0 {
        return None;
    }
    let num = u64::from(target_width) * u64::from(height);
    let w = u64::from(width);
    // Integer round-half-up.
    let h = (num + w / 2) / w;
    Some(h.clamp(1, u64::from(u32::MAX)) as u32)
}

/// Scale `page` to `target_width` pixels wide with a bilinear filter.
///
/// A page that already has the target width is passed through untouched.
/// `page_index` is only used for error context.
pub fn resize_to_width(
    page: RasterPage,
    target_width: u32,
    page_index: usize,
) -> Result<ResizedPage, StageError> {
    let transform_err = |detail: String| StageError::Transform {
        page: page_index,
        detail,
    };

    let target_height = scaled_height(page.width(), page.height(), target_width).ok_or_else(|| {
        transform_err(format!(
            "cannot resize {}x{} page to width {target_width}",
            page.width(),
            page.height()
        ))
    })?;

    if page.width() == target_width {
        return Ok(ResizedPage::new(page));
    }

    let src = page.to_rgba_image();
    let resized = imageops::resize(&src, target_width, target_height, FilterType::Triangle);
    debug!(
        "Resized {}x{} → {}x{}",
        page.width(),
        page.height(),
        target_width,
        target_height
    );

    RasterPage::from_rgba(resized)
        .map(ResizedPage::new)
        .map_err(|e| transform_err(e.to_string()))
}
