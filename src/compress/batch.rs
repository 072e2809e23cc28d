//! Directory batch compression.
//!
//! Files are compressed strictly one after another. The encoder already
//! uses every core, so running several instances at once only
//! oversubscribes the machine.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::PipelineError;
use crate::tile::INTERMEDIATE_FORMAT;

use super::backend::EncoderBackend;
use super::compressor::{ktx2_output_path, TileCompressor};
use super::outcome::{CompressionTotals, ConversionOutcome, Progress};

/// Result of compressing a directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// One outcome per input file, in processing order
    pub outcomes: Vec<ConversionOutcome>,

    /// Aggregated counts and sizes
    pub totals: CompressionTotals,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.totals.has_failures()
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ConversionOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.success)
    }
}

/// List the PNG files directly inside `dir`, sorted by file name.
pub async fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let read_error = |e: std::io::Error| PipelineError::SourceRead {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_error)?;
    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(INTERMEDIATE_FORMAT.extension()));
        if is_image && entry.file_type().await.map_err(read_error)?.is_file() {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

/// Compress every PNG in `input_dir` into `output_dir` (or alongside the
/// inputs when `None`), calling `progress` after each file.
///
/// # Errors
///
/// Only fails if the input directory cannot be listed or the output
/// directory cannot be created. Individual conversion failures are
/// recorded in the summary.
pub async fn compress_directory<B, F>(
    compressor: &TileCompressor<B>,
    input_dir: &Path,
    output_dir: Option<&Path>,
    mut progress: F,
) -> Result<BatchSummary, PipelineError>
where
    B: EncoderBackend,
    F: FnMut(Progress<'_>),
{
    let images = collect_images(input_dir).await?;

    if let Some(dir) = output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PipelineError::Persistence {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
    }

    info!(
        "Compressing {} file(s) from {} ({} mode)",
        images.len(),
        input_dir.display(),
        compressor.options().mode
    );

    let total = images.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut totals = CompressionTotals::default();

    for (index, input) in images.iter().enumerate() {
        let output = ktx2_output_path(input, output_dir);
        let outcome = compressor.compress(input, &output).await;
        totals.record(&outcome);

        let file_name = outcome.input_name();
        progress(Progress {
            index,
            total,
            file_name: &file_name,
            outcome: &outcome,
        });
        outcomes.push(outcome);
    }

    info!(
        "Batch finished: {} succeeded, {} failed, {:.1}% saved",
        totals.succeeded, totals.failed, totals.percent_saved
    );

    Ok(BatchSummary { outcomes, totals })
}
