//! Grid partitioning.
//!
//! Splits a `width x height` image into a row-major grid of rectangles with
//! a nominal edge length. Interior tiles are exactly `tile_size` square;
//! tiles in the last column and last row are clipped to the image bounds.
//!
//! ```text
//!   0        S        2S     W
//! 0 ┌────────┬────────┬─────┐
//!   │  0_0   │  1_0   │ 2_0 │
//! S ├────────┼────────┼─────┤
//!   │  0_1   │  1_1   │ 2_1 │
//! H └────────┴────────┴─────┘
//! ```
//!
//! The order of the returned regions is load-bearing: manifest chunks,
//! compression order, and report outcomes all follow it.

use crate::error::ConfigError;

use super::format::TileFormat;

// =============================================================================
// Tile Region
// =============================================================================

/// One cell of a tile grid, in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRegion {
    /// Grid column (0-indexed from left)
    pub col: u32,

    /// Grid row (0-indexed from top)
    pub row: u32,

    /// Left edge in pixels
    pub x: u32,

    /// Top edge in pixels
    pub y: u32,

    /// Width in pixels (clipped for the last column)
    pub width: u32,

    /// Height in pixels (clipped for the last row)
    pub height: u32,
}

impl TileRegion {
    /// Stable identifier derived from the grid position, e.g. `"3_1"`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.col, self.row)
    }

    /// File name of this tile in the given format, e.g. `"3_1.png"`.
    pub fn file_name(&self, format: TileFormat) -> String {
        format!("{}.{}", self.id(), format.extension())
    }

    /// Exclusive right edge in pixels.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge in pixels.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Pixel area.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &TileRegion) -> bool {
        (self.x as u64) < other.right()
            && (other.x as u64) < self.right()
            && (self.y as u64) < other.bottom()
            && (other.y as u64) < self.bottom()
    }

    /// Whether the rectangle lies inside a `width x height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }
}

// =============================================================================
// Partitioning
// =============================================================================

/// Number of grid columns and rows for an image.
///
/// `columns = ceil(width / tile_size)`, `rows = ceil(height / tile_size)`.
pub fn grid_dimensions(width: u32, height: u32, tile_size: u32) -> Result<(u32, u32), ConfigError> {
    validate_inputs(width, height, tile_size)?;
    Ok((width.div_ceil(tile_size), height.div_ceil(tile_size)))
}

/// Partition an image into tile regions in row-major order.
///
/// An image no larger than one tile in both directions yields a single
/// region covering the whole image.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any argument is zero.
pub fn partition(width: u32, height: u32, tile_size: u32) -> Result<Vec<TileRegion>, ConfigError> {
    let (columns, rows) = grid_dimensions(width, height, tile_size)?;

    let mut regions = Vec::with_capacity(columns as usize * rows as usize);
    for row in 0..rows {
        let y = row * tile_size;
        let tile_height = tile_size.min(height - y);

        for col in 0..columns {
            let x = col * tile_size;
            regions.push(TileRegion {
                col,
                row,
                x,
                y,
                width: tile_size.min(width - x),
                height: tile_height,
            });
        }
    }

    Ok(regions)
}

fn validate_inputs(width: u32, height: u32, tile_size: u32) -> Result<(), ConfigError> {
    if tile_size == 0 {
        return Err(ConfigError::InvalidTileSize(tile_size));
    }
    if width == 0 || height == 0 {
        return Err(ConfigError::InvalidDimensions { width, height });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
