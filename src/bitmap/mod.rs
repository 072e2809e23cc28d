//! Bitmap collaborator.
//!
//! The pipeline never touches pixels itself. Reading image dimensions and
//! cropping a rectangle out to a tile file are delegated to a
//! [`BitmapSource`], which keeps the grid and orchestration logic testable
//! with fakes that never decode anything.
//!
//! [`ImageBitmap`] is the production implementation, backed by the `image`
//! crate.

mod image_bitmap;

use std::path::Path;

use async_trait::async_trait;

use crate::error::BitmapError;

pub use image_bitmap::ImageBitmap;

/// Reads and crops raster images.
///
/// Implementations are treated as untrusted: callers check crop rectangles
/// against [`read_dimensions`](BitmapSource::read_dimensions) themselves.
#[async_trait]
pub trait BitmapSource: Send + Sync {
    /// Read the pixel dimensions `(width, height)` of the image at `path`.
    async fn read_dimensions(&self, path: &Path) -> Result<(u32, u32), BitmapError>;

    /// Crop the `width x height` rectangle at `(x, y)` and write it to
    /// `output`. The output format follows the file extension.
    async fn extract_region(
        &self,
        path: &Path,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        output: &Path,
    ) -> Result<(), BitmapError>;
}
