//! Tile layer.
//!
//! This module computes the tile grid of a source image and writes the
//! intermediate tile files the encoder consumes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           Pipeline Orchestrator         │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │   partition()   │    │  TileMaterializer   │
//! │  (pure grid     │───▶│  (crop + name each  │
//! │   math)         │    │   region)           │
//! └─────────────────┘    └──────────┬──────────┘
//!                                   │
//!                                   ▼
//!                        ┌─────────────────────┐
//!                        │    BitmapSource     │
//!                        └─────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`partition`]: Row-major grid of [`TileRegion`]s covering an image exactly
//! - [`grid_dimensions`]: Column and row counts for an image
//! - [`TileMaterializer`]: Crops each region to `"{col}_{row}.{ext}"`
//! - [`TileFormat`]: Intermediate (`png`) and compressed (`ktx2`) tile formats
//!
//! # Example
//!
//! ```
//! use ktx_tiler::tile::partition;
//!
//! let regions = partition(2048, 1536, 1024).unwrap();
//! assert_eq!(regions.len(), 4);
//!
//! let last = regions[3];
//! assert_eq!((last.x, last.y, last.width, last.height), (1024, 1024, 1024, 512));
//! ```

mod format;
mod grid;
mod materialize;

pub use format::{TileFormat, COMPRESSED_FORMAT, INTERMEDIATE_FORMAT};
pub use grid::{grid_dimensions, partition, TileRegion};
pub use materialize::TileMaterializer;
