//! Tile file formats.
//!
//! Tiles exist in two on-disk forms during a run: the intermediate PNG crop
//! written by the materializer and the KTX2 container produced by the
//! encoder. The manifest's `format` tag records which form its chunk
//! filenames currently reference.

use std::fmt;

use serde::{Deserialize, Serialize};

/// On-disk format of a tile file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFormat {
    /// Lossless intermediate crop
    Png,
    /// GPU-native compressed container
    Ktx2,
}

/// Format of tiles written by the materializer.
pub const INTERMEDIATE_FORMAT: TileFormat = TileFormat::Png;

/// Format of tiles written by the encoder.
pub const COMPRESSED_FORMAT: TileFormat = TileFormat::Ktx2;

impl TileFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            TileFormat::Png => "png",
            TileFormat::Ktx2 => "ktx2",
        }
    }

    /// Match a file extension, ignoring ASCII case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("png") {
            Some(TileFormat::Png)
        } else if ext.eq_ignore_ascii_case("ktx2") {
            Some(TileFormat::Ktx2)
        } else {
            None
        }
    }
}

impl fmt::Display for TileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
