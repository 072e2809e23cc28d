//! Command-line configuration for KTX Tiler.
//!
//! Every option can also be set through an environment variable with the
//! `KTX_TILER_` prefix:
//!
//! - `KTX_TILER_TILE_SIZE` - Tile edge length in pixels (default: 1024)
//! - `KTX_TILER_MODE` - `etc1s` or `uastc` (default: etc1s)
//! - `KTX_TILER_QUALITY` - ETC1S quality level 1-255 (default: 128)
//! - `KTX_TILER_COMPRESSION` - ETC1S compression level 0-5 (default: 2)
//! - `KTX_TILER_THREADS` - Encoder thread count (default: all cores)
//! - `KTX_TILER_TOKTX` - Path to the `toktx` binary (default: search `PATH`)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::compress::{
    CompressionMode, CompressionOptions, DEFAULT_COMPRESSION_LEVEL, DEFAULT_QUALITY,
};
use crate::error::ConfigError;
use crate::pipeline::DEFAULT_TILE_SIZE;

/// Suffix appended to the image stem for the default tile-set directory.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_tiles";

// =============================================================================
// CLI Arguments
// =============================================================================

/// KTX Tiler - split large images into KTX2 texture tiles.
#[derive(Parser, Debug, Clone)]
#[command(name = "ktx-tiler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Split an image into a grid of KTX2 tiles with a manifest.
    Tile(TileConfig),

    /// Convert a PNG file, or every PNG in a directory, to KTX2.
    Convert(ConvertConfig),

    /// Verify that the encoder binary is reachable.
    Check(CheckConfig),
}

/// Encoder settings shared by `tile` and `convert`.
#[derive(Args, Debug, Clone)]
pub struct EncoderConfig {
    /// Compression mode: etc1s (smaller) or uastc (higher quality).
    #[arg(long, default_value = "etc1s", env = "KTX_TILER_MODE")]
    pub mode: String,

    /// ETC1S quality level (1-255).
    #[arg(long, default_value_t = DEFAULT_QUALITY, env = "KTX_TILER_QUALITY")]
    pub quality: u32,

    /// ETC1S compression level (0-5).
    #[arg(long, default_value_t = DEFAULT_COMPRESSION_LEVEL, env = "KTX_TILER_COMPRESSION")]
    pub compression: u32,

    /// Generate mipmaps.
    #[arg(long, default_value_t = false)]
    pub mipmaps: bool,

    /// Encode as a tangent-space normal map.
    #[arg(long, default_value_t = false)]
    pub normal_map: bool,

    /// Encoder thread count (defaults to all cores).
    #[arg(long, env = "KTX_TILER_THREADS")]
    pub threads: Option<u32>,

    /// Path to the toktx binary.
    #[arg(long, env = "KTX_TILER_TOKTX")]
    pub toktx: Option<PathBuf>,
}

impl EncoderConfig {
    /// Parse and validate into [`CompressionOptions`].
    pub fn to_options(&self) -> Result<CompressionOptions, ConfigError> {
        let options = CompressionOptions {
            mode: self.mode.parse::<CompressionMode>()?,
            quality: self.quality,
            compression_level: self.compression,
            mipmaps: self.mipmaps,
            normal_map: self.normal_map,
            threads: self.threads,
            tool_path: self.toktx.clone(),
        };
        options.validate()?;
        Ok(options)
    }
}

/// Arguments for `tile`.
#[derive(Args, Debug, Clone)]
pub struct TileConfig {
    /// Source image (PNG or JPEG).
    pub input: PathBuf,

    /// Output directory (defaults to `<image stem>_tiles` next to the image).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "KTX_TILER_TILE_SIZE")]
    pub tile_size: u32,

    /// Print the aggregate report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub encoder: EncoderConfig,
}

impl TileConfig {
    /// Validate the configuration and return an error if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        self.encoder.to_options().map(|_| ())
    }

    /// Resolved output directory.
    pub fn output_dir(&self) -> PathBuf {
        if let Some(ref output) = self.output {
            return output.clone();
        }

        let stem = self
            .input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        self.input
            .with_file_name(format!("{}{}", stem, DEFAULT_OUTPUT_SUFFIX))
    }
}

/// Arguments for `convert`.
#[derive(Args, Debug, Clone)]
pub struct ConvertConfig {
    /// A PNG file or a directory of PNG files.
    pub input: PathBuf,

    /// Output directory (defaults to alongside the input files).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub encoder: EncoderConfig,
}

/// Arguments for `check`.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Path to the toktx binary.
    #[arg(long, env = "KTX_TILER_TOKTX")]
    pub toktx: Option<PathBuf>,
}

// =============================================================================
// Tests
// =============================================================================
