//! KTX2 compression through the external encoder.
//!
//! # Components
//!
//! - [`CompressionOptions`]: Mode, quality and flags, translated to `toktx` arguments
//! - [`EncoderBackend`]: The process seam; [`ProcessBackend`] spawns the real binary
//! - [`TileCompressor`]: Runs one conversion and normalizes every failure into
//!   a [`ConversionOutcome`]
//! - [`compress_directory`]: Sequential batch over a directory of PNGs with a
//!   progress callback
//! - [`CompressionTotals`]: Byte counts and savings over many outcomes
//!
//! # Example
//!
//! ```ignore
//! use ktx_tiler::compress::{CompressionMode, CompressionOptions, TileCompressor};
//!
//! let compressor = TileCompressor::from_options(CompressionOptions::with_mode(
//!     CompressionMode::Uastc,
//! ))?;
//!
//! let outcome = compressor
//!     .compress("tiles/0_0.png".as_ref(), "out/0_0.ktx2".as_ref())
//!     .await;
//! if !outcome.success {
//!     eprintln!("failed: {}", outcome.error.unwrap_or_default());
//! }
//! ```

mod backend;
mod batch;
mod compressor;
mod options;
mod outcome;

pub use backend::{EncoderBackend, ProcessBackend, ToolOutput, DEFAULT_TOOL_BINARY};
pub use batch::{collect_images, compress_directory, BatchSummary};
pub use compressor::{ktx2_output_path, TileCompressor};
pub use options::{
    CompressionMode, CompressionOptions, DEFAULT_COMPRESSION_LEVEL, DEFAULT_QUALITY,
    ETC1S_MAX_CODEBOOK, MAX_COMPRESSION_LEVEL, MAX_QUALITY, MIN_QUALITY, UASTC_QUALITY,
    UASTC_ZSTD_LEVEL,
};
pub use outcome::{savings_percent, CompressionTotals, ConversionOutcome, Progress};
