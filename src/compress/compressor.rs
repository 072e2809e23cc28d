//! Single-file compression.
//!
//! [`TileCompressor::compress`] never returns an error: spawn failures,
//! non-zero exits and missing output all become a failed
//! [`ConversionOutcome`]. Sizes are read back from the filesystem rather
//! than trusted from the tool's own output, and any file already at the
//! output path is removed before the encoder runs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::{ConfigError, ToolError};
use crate::tile::COMPRESSED_FORMAT;

use super::backend::{EncoderBackend, ProcessBackend};
use super::options::CompressionOptions;
use super::outcome::ConversionOutcome;

/// Compresses image files with a fixed set of options.
pub struct TileCompressor<B: EncoderBackend> {
    backend: B,
    options: CompressionOptions,
}

impl TileCompressor<ProcessBackend> {
    /// Compressor that spawns the encoder binary named by `options`, or the
    /// one found on the executable path.
    pub fn from_options(options: CompressionOptions) -> Result<Self, ConfigError> {
        let backend = ProcessBackend::locate_or_default(options.tool_path.as_deref());
        Self::new(backend, options)
    }
}

impl<B: EncoderBackend> TileCompressor<B> {
    /// Create a compressor.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `options` are out of range.
    pub fn new(backend: B, options: CompressionOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self { backend, options })
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compress `input` into `output`.
    pub async fn compress(&self, input: &Path, output: &Path) -> ConversionOutcome {
        let start = Instant::now();
        let mode = self.options.mode;
        let args = self.options.build_args(input, output);

        let original_size = match tokio::fs::metadata(input).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                let message = format!("cannot read input {}: {}", input.display(), e);
                warn!("Compression of {} failed: {}", input.display(), message);
                return ConversionOutcome::failed(input, output, start.elapsed(), mode, message);
            }
        };

        // A file left by an earlier run must not count as this run's output.
        if let Err(e) = remove_stale_output(output).await {
            let message = format!("cannot remove stale output {}: {}", output.display(), e);
            warn!("Compression of {} failed: {}", input.display(), message);
            return ConversionOutcome::failed(input, output, start.elapsed(), mode, message);
        }

        if let Err(err) = self.run_encoder(&args).await {
            warn!("Compression of {} failed: {}", input.display(), err);
            let message = err.to_string();
            return ConversionOutcome::failed(input, output, start.elapsed(), mode, message);
        }

        let compressed_size = match tokio::fs::metadata(output).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                let message =
                    format!("encoder produced no output at {}: {}", output.display(), e);
                warn!("Compression of {} failed: {}", input.display(), message);
                return ConversionOutcome::failed(input, output, start.elapsed(), mode, message);
            }
        };

        let outcome = ConversionOutcome::succeeded(
            input,
            output,
            original_size,
            compressed_size,
            start.elapsed(),
            mode,
        );
        debug!(
            "Compressed {} ({} -> {} bytes, {:.1}% saved) in {:?}",
            input.display(),
            original_size,
            compressed_size,
            outcome.ratio,
            outcome.duration
        );
        outcome
    }

    /// Compress `input` next to itself or into `output_dir`, swapping the
    /// extension to `.ktx2`.
    pub async fn convert_file(&self, input: &Path, output_dir: Option<&Path>) -> ConversionOutcome {
        let output = ktx2_output_path(input, output_dir);

        if let Some(dir) = output_dir {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                let message = format!("cannot create {}: {}", dir.display(), e);
                let mode = self.options.mode;
                let elapsed = Default::default();
                return ConversionOutcome::failed(input, &output, elapsed, mode, message);
            }
        }

        self.compress(input, &output).await
    }

    /// Verify the encoder can be run, returning its reported version.
    pub async fn check(&self) -> Result<String, ToolError> {
        let output = self
            .backend
            .invoke(&[OsString::from("--version")])
            .await?
            .into_result()?;

        let version = if output.stdout.trim().is_empty() {
            output.stderr.trim()
        } else {
            output.stdout.trim()
        };
        Ok(version.to_string())
    }

    async fn run_encoder(&self, args: &[OsString]) -> Result<(), ToolError> {
        self.backend.invoke(args).await?.into_result().map(|_| ())
    }
}

async fn remove_stale_output(output: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(output).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Output path for converting `input` to KTX2.
pub fn ktx2_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = Path::new(input.file_name().unwrap_or(input.as_os_str()))
        .with_extension(COMPRESSED_FORMAT.extension());

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}
