use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tile::{grid_dimensions, TileFormat, TileRegion, INTERMEDIATE_FORMAT};

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

// =============================================================================
// Tile File
// =============================================================================

/// A materialized tile: its grid identity plus the file that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileFile {
    /// Stable identifier, `"{col}_{row}"`
    pub id: String,

    /// Grid column
    pub col: u32,

    /// Grid row
    pub row: u32,

    /// Left edge in source pixels
    pub x: u32,

    /// Top edge in source pixels
    pub y: u32,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Bare file name. `.ktx2` tiles sit in the tile-set directory; `.png`
    /// tiles (intermediate manifest, or failed chunks in the final one) sit
    /// in its `.intermediate/` subdirectory.
    pub file: String,
}

impl TileFile {
    /// Describe `region` as stored in `file`.
    pub fn from_region(region: &TileRegion, file: impl Into<String>) -> Self {
        Self {
            id: region.id(),
            col: region.col,
            row: region.row,
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            file: file.into(),
        }
    }

    /// Format implied by the file extension, if recognised.
    pub fn format(&self) -> Option<TileFormat> {
        self.file
            .rsplit_once('.')
            .and_then(|(_, ext)| TileFormat::from_extension(ext))
    }

    /// File name this tile would have in `format`.
    pub fn file_name_as(&self, format: TileFormat) -> String {
        let stem = self
            .file
            .rsplit_once('.')
            .map_or(self.file.as_str(), |(stem, _)| stem);
        format!("{}.{}", stem, format.extension())
    }

    /// Rewrite the file extension to `format`.
    pub fn set_format(&mut self, format: TileFormat) {
        self.file = self.file_name_as(format);
    }
}

// =============================================================================
// Manifest
// =============================================================================

/// The descriptor of one tile set.
///
/// `chunks` are in row-major grid order. Runtime loaders depend on both the
/// field names and that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub rows: u32,
    pub format: TileFormat,
    pub chunks: Vec<TileFile>,
}

impl Manifest {
    /// Build an intermediate-format manifest for a square-tiled image.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the dimensions are invalid or `chunks`
    /// does not match the grid.
    pub fn build(
        width: u32,
        height: u32,
        tile_size: u32,
        chunks: Vec<TileFile>,
    ) -> Result<Self, ConfigError> {
        let (columns, rows) = grid_dimensions(width, height, tile_size)?;

        let manifest = Self {
            version: MANIFEST_VERSION,
            width,
            height,
            tile_width: tile_size,
            tile_height: tile_size,
            columns,
            rows,
            format: INTERMEDIATE_FORMAT,
            chunks,
        };
        manifest.validate()?;

        Ok(manifest)
    }

    /// Check the grid invariants.
    ///
    /// - `columns = ceil(width / tileWidth)` and `rows = ceil(height / tileHeight)`
    /// - one chunk per cell, in row-major order
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != MANIFEST_VERSION {
            return Err(invalid(format!(
                "unsupported version {} (expected {})",
                self.version, MANIFEST_VERSION
            )));
        }

        let (columns, _) = grid_dimensions(self.width, self.height, self.tile_width)?;
        let (_, rows) = grid_dimensions(self.width, self.height, self.tile_height)?;
        if (columns, rows) != (self.columns, self.rows) {
            return Err(invalid(format!(
                "grid is {}x{} but {}x{} image with {}x{} tiles needs {}x{}",
                self.columns,
                self.rows,
                self.width,
                self.height,
                self.tile_width,
                self.tile_height,
                columns,
                rows
            )));
        }

        let expected = columns as usize * rows as usize;
        if self.chunks.len() != expected {
            return Err(invalid(format!(
                "{} chunks for a {}x{} grid (expected {})",
                self.chunks.len(),
                columns,
                rows,
                expected
            )));
        }

        for (index, chunk) in self.chunks.iter().enumerate() {
            let col = (index % columns as usize) as u32;
            let row = (index / columns as usize) as u32;
            if (chunk.col, chunk.row) != (col, row) {
                return Err(invalid(format!(
                    "chunk {} is at ({}, {}), expected ({}, {})",
                    index, chunk.col, chunk.row, col, row
                )));
            }
        }

        Ok(())
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the manifest has no chunks (never true for a valid manifest).
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Mutable access to one chunk.
    pub fn chunk_mut(&mut self, index: usize) -> Option<&mut TileFile> {
        self.chunks.get_mut(index)
    }

    /// Flip the format tag to `format` without touching chunk file names.
    pub fn set_format(&mut self, format: TileFormat) {
        self.format = format;
    }

    /// Chunks whose file name does not match the manifest's format tag.
    ///
    /// After a run with failed tiles these are the entries downstream
    /// loaders should treat as missing.
    pub fn mismatched_chunks(&self) -> impl Iterator<Item = &TileFile> {
        self.chunks
            .iter()
            .filter(move |chunk| chunk.format() != Some(self.format))
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::InvalidManifest(message)
}

// =============================================================================
// Tests
// =============================================================================
