//! Tile materialization.
//!
//! Turns grid regions into tile files on disk. Pixel work is delegated to a
//! [`BitmapSource`]; this module owns naming (`"{col}_{row}.{ext}"`), the
//! bounds check against the source dimensions, and packaging the result
//! as a [`TileFile`].

use std::path::PathBuf;

use tracing::debug;

use crate::bitmap::BitmapSource;
use crate::error::PipelineError;
use crate::manifest::TileFile;

use super::format::TileFormat;
use super::grid::TileRegion;

/// Writes the tiles of one source image into one directory.
pub struct TileMaterializer<'a, B: BitmapSource + ?Sized> {
    bitmap: &'a B,
    source: PathBuf,
    dimensions: (u32, u32),
    output_dir: PathBuf,
    format: TileFormat,
}

impl<'a, B: BitmapSource + ?Sized> TileMaterializer<'a, B> {
    /// Create a materializer for a source whose dimensions are already known.
    pub fn new(
        bitmap: &'a B,
        source: impl Into<PathBuf>,
        dimensions: (u32, u32),
        output_dir: impl Into<PathBuf>,
        format: TileFormat,
    ) -> Self {
        Self {
            bitmap,
            source: source.into(),
            dimensions,
            output_dir: output_dir.into(),
            format,
        }
    }

    /// Create a materializer, reading the source dimensions through `bitmap`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceRead`] if the image cannot be read.
    pub async fn open(
        bitmap: &'a B,
        source: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        format: TileFormat,
    ) -> Result<Self, PipelineError> {
        let source = source.into();
        let dimensions = bitmap
            .read_dimensions(&source)
            .await
            .map_err(|e| PipelineError::SourceRead {
                path: source.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(Self::new(bitmap, source, dimensions, output_dir, format))
    }

    /// Source image dimensions `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Crop `region` out of the source and write it as one tile file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Extraction`] if the region falls outside the
    /// source or the bitmap collaborator fails.
    pub async fn materialize(&self, region: &TileRegion) -> Result<TileFile, PipelineError> {
        let (width, height) = self.dimensions;
        if !region.fits_within(width, height) || region.area() == 0 {
            return Err(PipelineError::Extraction {
                tile: region.id(),
                message: format!(
                    "region {}x{} at ({}, {}) is outside the {}x{} source",
                    region.width, region.height, region.x, region.y, width, height
                ),
            });
        }

        let file = region.file_name(self.format);
        let path = self.output_dir.join(&file);

        self.bitmap
            .extract_region(
                &self.source,
                region.x,
                region.y,
                region.width,
                region.height,
                &path,
            )
            .await
            .map_err(|e| PipelineError::Extraction {
                tile: region.id(),
                message: e.to_string(),
            })?;

        debug!("Materialized tile {} -> {}", region.id(), path.display());
        Ok(TileFile::from_region(region, file))
    }
}
