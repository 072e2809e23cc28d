//! # KTX Tiler
//!
//! Splits large raster images into grids of GPU-friendly KTX2 textures.
//!
//! An oversized image is partitioned into a regular grid of tiles, each tile
//! is compressed into a KTX2 container by KTX-Software's `toktx` encoder, and
//! a manifest (`metadata.json`) records how to reassemble and stream the
//! tiles at runtime.
//!
//! ## Features
//!
//! - **Deterministic grids**: Row-major tiles that cover the image exactly,
//!   with clipped edge tiles
//! - **ETC1S and UASTC**: Basis Universal modes with mipmap and normal-map options
//! - **Partial failure**: A tile that fails to compress is recorded, not fatal
//! - **Atomic manifests**: `metadata.json` is always replaced whole
//!
//! ## Architecture
//!
//! - [`tile`] - Grid partitioning and tile materialization
//! - [`bitmap`] - Image dimension reads and crops (`image` crate)
//! - [`manifest`] - Tile-set descriptor and its persistence
//! - [`compress`] - Encoder invocation, outcomes and batch conversion
//! - [`pipeline`] - End-to-end orchestration and the aggregate report
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use ktx_tiler::{pipeline, CompressionOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let report = pipeline::run(
//!         "world.png".as_ref(),
//!         "world_tiles".as_ref(),
//!         1024,
//!         CompressionOptions::default(),
//!     )
//!     .await
//!     .expect("tiling failed");
//!
//!     println!(
//!         "{} tiles, {} failed, {:.1}% saved",
//!         report.outcomes.len(),
//!         report.totals.failed,
//!         report.compression_ratio()
//!     );
//! }
//! ```

pub mod bitmap;
pub mod compress;
pub mod config;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod tile;

// Re-export commonly used types
pub use bitmap::{BitmapSource, ImageBitmap};
pub use compress::{
    compress_directory, BatchSummary, CompressionMode, CompressionOptions, CompressionTotals,
    ConversionOutcome, EncoderBackend, ProcessBackend, Progress, TileCompressor, ToolOutput,
};
pub use config::{CheckConfig, Cli, Command, ConvertConfig, EncoderConfig, TileConfig};
pub use error::{BitmapError, ConfigError, ManifestError, PipelineError, ToolError};
pub use manifest::{Manifest, TileFile, MANIFEST_FILE_NAME, MANIFEST_VERSION};
pub use pipeline::{AggregateReport, Pipeline, DEFAULT_TILE_SIZE};
pub use tile::{partition, TileFormat, TileRegion};
