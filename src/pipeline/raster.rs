//! Owned RGBA page buffers passed between pipeline stages.
//!
//! The rendering backend hands out bitmaps tied to its own handles. Every
//! stage after rendering works on a [`RasterPage`], a plain value with a
//! documented layout that is copied out of the backend bitmap so no buffer
//! outlives the document it came from.
//!
//! Layout: 4 channels (R, G, B, A), 8 bits each, rows top to bottom, each row
//! `stride` bytes long with `stride >= width * 4`. Consumers must step rows
//! by `stride`, never by `width * 4`.

use image::{DynamicImage, RgbaImage};
use std::fmt;

/// Bytes per pixel of every page buffer.
pub const CHANNELS: usize = 4;

/// Reasons a buffer does not describe a valid page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    EmptyDimensions { width: u32, height: u32 },
    StrideTooSmall { stride: usize, min: usize },
    ShortBuffer { len: usize, needed: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::EmptyDimensions { width, height } => {
                write!(f, "empty page buffer ({width}x{height})")
            }
            LayoutError::StrideTooSmall { stride, min } => {
                write!(f, "row stride {stride} is smaller than width*4 = {min}")
            }
            LayoutError::ShortBuffer { len, needed } => {
                write!(f, "buffer holds {len} bytes, layout needs {needed}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// A decoded page image before resizing.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterPage {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl fmt::Debug for RasterPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterPage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl RasterPage {
    /// Wrap a raw RGBA8 buffer, checking the layout invariants.
    pub fn from_raw(
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self, LayoutError> {
        if width == 0 || height == 0 {
            return Err(LayoutError::EmptyDimensions { width, height });
        }
        let min = width as usize * CHANNELS;
        if stride < min {
            return Err(LayoutError::StrideTooSmall { stride, min });
        }
        // The last row only needs its visible pixels.
        let needed = stride * (height as usize - 1) + min;
        if data.len() < needed {
            return Err(LayoutError::ShortBuffer {
                len: data.len(),
                needed,
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Copy a backend image into a tightly packed page buffer.
    pub fn from_image(img: &DynamicImage) -> Result<Self, LayoutError> {
        Self::from_rgba(img.to_rgba8())
    }

    /// Take ownership of an RGBA image (stride = width * 4).
    pub fn from_rgba(img: RgbaImage) -> Result<Self, LayoutError> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, width as usize * CHANNELS, img.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row, including any alignment padding.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Visible bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * CHANNELS]
    }

    /// Repack into an `RgbaImage`, dropping row padding.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let row_len = self.width as usize * CHANNELS;
        let packed = if self.stride == row_len {
            self.data[..row_len * self.height as usize].to_vec()
        } else {
            let mut buf = Vec::with_capacity(row_len * self.height as usize);
            for y in 0..self.height {
                buf.extend_from_slice(self.row(y));
            }
            buf
        };
        // Length is exactly width * height * 4 by construction.
        RgbaImage::from_raw(self.width, self.height, packed)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

/// A page scaled to the configured output width.
///
/// Only produced by [`crate::pipeline::transform::resize_to_width`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedPage {
    page: RasterPage,
}

impl ResizedPage {
    pub(crate) fn new(page: RasterPage) -> Self {
        Self { page }
    }

    pub fn width(&self) -> u32 {
        self.page.width
    }

    pub fn height(&self) -> u32 {
        self.page.height
    }

    pub fn raster(&self) -> &RasterPage {
        &self.page
    }

    pub fn into_raster(self) -> RasterPage {
        self.page
    }
}
