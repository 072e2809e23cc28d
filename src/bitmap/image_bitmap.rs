//! `image`-crate backed bitmap source.
//!
//! Decoding is CPU bound, so all work runs on tokio's blocking pool. The
//! most recently decoded image is kept in memory; a tiling run crops every
//! tile from the same source and would otherwise decode it once per tile.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

use crate::error::BitmapError;

use super::BitmapSource;

struct DecodedImage {
    path: PathBuf,
    image: Arc<DynamicImage>,
}

/// Bitmap source backed by the `image` crate (PNG and JPEG).
#[derive(Default)]
pub struct ImageBitmap {
    decoded: Mutex<Option<DecodedImage>>,
}

impl ImageBitmap {
    /// Create a bitmap source with an empty decode cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached decoded image, releasing its memory.
    pub fn clear(&self) {
        *self.decoded.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn cached(&self, path: &Path) -> Option<Arc<DynamicImage>> {
        let guard = self.decoded.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|decoded| decoded.path == path)
            .map(|decoded| Arc::clone(&decoded.image))
    }

    async fn load(&self, path: &Path) -> Result<Arc<DynamicImage>, BitmapError> {
        if let Some(image) = self.cached(path) {
            return Ok(image);
        }

        debug!("Decoding source image {}", path.display());
        let owned = path.to_path_buf();
        let image = tokio::task::spawn_blocking(move || image::open(&owned))
            .await
            .map_err(|e| read_error(path, e))?
            .map_err(|e| read_error(path, e))?;
        let image = Arc::new(image);

        *self.decoded.lock().unwrap_or_else(PoisonError::into_inner) = Some(DecodedImage {
            path: path.to_path_buf(),
            image: Arc::clone(&image),
        });

        Ok(image)
    }
}

#[async_trait]
impl BitmapSource for ImageBitmap {
    async fn read_dimensions(&self, path: &Path) -> Result<(u32, u32), BitmapError> {
        if let Some(image) = self.cached(path) {
            return Ok((image.width(), image.height()));
        }

        // Header-only read; the full decode happens on the first crop.
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || image::image_dimensions(&owned))
            .await
            .map_err(|e| read_error(path, e))?
            .map_err(|e| read_error(path, e))
    }

    async fn extract_region(
        &self,
        path: &Path,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        output: &Path,
    ) -> Result<(), BitmapError> {
        let image = self.load(path).await?;

        let fits = x as u64 + width as u64 <= image.width() as u64
            && y as u64 + height as u64 <= image.height() as u64;
        if !fits || width == 0 || height == 0 {
            return Err(BitmapError::OutOfBounds {
                x,
                y,
                width,
                height,
                image_width: image.width(),
                image_height: image.height(),
            });
        }

        let target = output.to_path_buf();
        tokio::task::spawn_blocking(move || image.crop_imm(x, y, width, height).save(&target))
            .await
            .map_err(|e| write_error(output, e))?
            .map_err(|e| write_error(output, e))
    }
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> BitmapError {
    BitmapError::Read {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> BitmapError {
    BitmapError::Write {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
