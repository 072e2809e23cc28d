//! Pipeline orchestration.
//!
//! # State Machine
//!
//! ```text
//! Partition ──▶ Materialize ──▶ Compress ──▶ Finalize
//!   read dims     crop tiles      one tile      remove intermediates
//!   grid math     persist png     at a time     persist ktx2 manifest
//!                 manifest                      build report
//! ```
//!
//! Each step awaits the previous one; compression reads the files
//! materialization wrote. Only the orchestrator holds the manifest while it
//! is being rewritten, one entry at a time after that tile's outcome is
//! known.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::bitmap::{BitmapSource, ImageBitmap};
use crate::compress::{
    CompressionOptions, CompressionTotals, ConversionOutcome, EncoderBackend, Progress,
    ProcessBackend, TileCompressor,
};
use crate::error::{ConfigError, PipelineError};
use crate::manifest::{self, Manifest};
use crate::tile::{partition, TileMaterializer, COMPRESSED_FORMAT, INTERMEDIATE_FORMAT};

use super::report::AggregateReport;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 1024;

/// Subdirectory of the output directory holding intermediate tiles.
pub const INTERMEDIATE_DIR_NAME: &str = ".intermediate";

// =============================================================================
// Pipeline
// =============================================================================

/// Tiles one image into a KTX2 tile set.
///
/// # Type Parameters
///
/// * `B` - Bitmap collaborator used to read and crop the source
/// * `E` - Encoder backend used to compress tiles
///
/// # Example
///
/// ```ignore
/// use ktx_tiler::bitmap::ImageBitmap;
/// use ktx_tiler::compress::{CompressionOptions, TileCompressor};
/// use ktx_tiler::pipeline::Pipeline;
///
/// let compressor = TileCompressor::from_options(CompressionOptions::default())?;
/// let pipeline = Pipeline::new(ImageBitmap::new(), compressor, 1024)?;
///
/// let report = pipeline.run("world.png".as_ref(), "world_tiles".as_ref()).await?;
/// println!("{} tiles, {:.1}% saved", report.outcomes.len(), report.compression_ratio());
/// ```
pub struct Pipeline<B: BitmapSource, E: EncoderBackend> {
    bitmap: B,
    compressor: TileCompressor<E>,
    tile_size: u32,
}

impl<B: BitmapSource, E: EncoderBackend> Pipeline<B, E> {
    /// Create a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTileSize`] if `tile_size` is zero.
    pub fn new(
        bitmap: B,
        compressor: TileCompressor<E>,
        tile_size: u32,
    ) -> Result<Self, ConfigError> {
        if tile_size == 0 {
            return Err(ConfigError::InvalidTileSize(tile_size));
        }
        Ok(Self {
            bitmap,
            compressor,
            tile_size,
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn compressor(&self) -> &TileCompressor<E> {
        &self.compressor
    }

    pub fn bitmap(&self) -> &B {
        &self.bitmap
    }

    /// Run the full pipeline for `input`, writing the tile set to `output_dir`.
    pub async fn run(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<AggregateReport, PipelineError> {
        self.run_with_progress(input, output_dir, |_| {}).await
    }

    /// Run the full pipeline, calling `progress` after each tile is compressed.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be read, any tile cannot be extracted, or a
    /// manifest cannot be written. Tile compression failures do not abort the
    /// run; they are reported in [`AggregateReport::outcomes`].
    pub async fn run_with_progress<F>(
        &self,
        input: &Path,
        output_dir: &Path,
        mut progress: F,
    ) -> Result<AggregateReport, PipelineError>
    where
        F: FnMut(Progress<'_>),
    {
        // Partition
        let staging_dir = output_dir.join(INTERMEDIATE_DIR_NAME);
        let materializer =
            TileMaterializer::open(&self.bitmap, input, &staging_dir, INTERMEDIATE_FORMAT).await?;
        let (width, height) = materializer.dimensions();
        let regions = partition(width, height, self.tile_size)?;
        info!(
            "Tiling {} ({}x{}) into {} tile(s) of {}px",
            input.display(),
            width,
            height,
            regions.len(),
            self.tile_size
        );

        // Materialize
        create_dir(&staging_dir).await?;
        let mut chunks = Vec::with_capacity(regions.len());
        for region in &regions {
            chunks.push(materializer.materialize(region).await?);
        }

        let mut manifest = Manifest::build(width, height, self.tile_size, chunks)?;
        persist_manifest(&manifest, output_dir).await?;
        info!("Wrote {} intermediate tile(s)", manifest.len());

        // Compress
        let (outcomes, totals) = self
            .compress_tiles(&mut manifest, &staging_dir, output_dir, &mut progress)
            .await;

        // Finalize
        let mut warnings = Vec::new();
        if let Err(e) = tokio::fs::remove_dir_all(&staging_dir).await {
            let message = format!(
                "failed to remove intermediate tiles in {}: {}",
                staging_dir.display(),
                e
            );
            warn!("{}", message);
            warnings.push(message);
        }

        manifest.set_format(COMPRESSED_FORMAT);
        let manifest_path = persist_manifest(&manifest, output_dir).await?;

        info!(
            "Wrote {}: {} of {} tile(s) compressed, {} -> {} bytes ({:.1}% saved)",
            manifest_path.display(),
            totals.succeeded,
            totals.total(),
            totals.original_bytes,
            totals.compressed_bytes,
            totals.percent_saved
        );
        if totals.has_failures() {
            warn!("{} tile(s) failed to compress", totals.failed);
        }

        Ok(AggregateReport {
            manifest,
            outcomes,
            totals,
            warnings,
        })
    }

    async fn compress_tiles<F>(
        &self,
        manifest: &mut Manifest,
        staging_dir: &Path,
        output_dir: &Path,
        progress: &mut F,
    ) -> (Vec<ConversionOutcome>, CompressionTotals)
    where
        F: FnMut(Progress<'_>),
    {
        let total = manifest.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut totals = CompressionTotals::default();

        for index in 0..total {
            let Some(chunk) = manifest.chunk_mut(index) else {
                break;
            };
            let input = staging_dir.join(&chunk.file);
            let output = output_dir.join(chunk.file_name_as(COMPRESSED_FORMAT));

            let outcome = self.compressor.compress(&input, &output).await;
            totals.record(&outcome);

            if outcome.success {
                chunk.set_format(COMPRESSED_FORMAT);
                debug!("Tile {} compressed ({:.1}% saved)", chunk.id, outcome.ratio);
            } else {
                warn!(
                    "Tile {} failed: {}",
                    chunk.id,
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }

            progress(Progress {
                index,
                total,
                file_name: &chunk.file,
                outcome: &outcome,
            });
            outcomes.push(outcome);
        }

        (outcomes, totals)
    }
}

/// Write `manifest` on the blocking pool; the atomic write ends in an fsync.
async fn persist_manifest(manifest: &Manifest, dir: &Path) -> Result<PathBuf, PipelineError> {
    let snapshot = manifest.clone();
    let target = dir.to_path_buf();
    tokio::task::spawn_blocking(move || manifest::persist(&snapshot, &target))
        .await
        .map_err(|e| PipelineError::Persistence {
            path: manifest::manifest_path(dir).display().to_string(),
            message: e.to_string(),
        })?
        .map_err(PipelineError::from)
}

async fn create_dir(dir: &Path) -> Result<(), PipelineError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PipelineError::Persistence {
            path: dir.display().to_string(),
            message: e.to_string(),
        })
}

// =============================================================================
// Convenience Entry Point
// =============================================================================

/// Tile `input` into `output_dir` with the `image`-crate bitmap source and
/// the encoder binary named by `options`.
///
/// Options and tile size are validated before any file is touched.
pub async fn run(
    input: &Path,
    output_dir: &Path,
    tile_size: u32,
    options: CompressionOptions,
) -> Result<AggregateReport, PipelineError> {
    default_pipeline(tile_size, options)?
        .run(input, output_dir)
        .await
}

/// Build the production pipeline.
pub fn default_pipeline(
    tile_size: u32,
    options: CompressionOptions,
) -> Result<Pipeline<ImageBitmap, ProcessBackend>, ConfigError> {
    let compressor = TileCompressor::from_options(options)?;
    Pipeline::new(ImageBitmap::new(), compressor, tile_size)
}
