//! Per-file compression results and their aggregation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::options::CompressionMode;

// =============================================================================
// Conversion Outcome
// =============================================================================

/// Result of compressing one file.
///
/// A failed conversion always reports zero sizes and a zero ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub success: bool,
    pub input: PathBuf,
    pub output: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,

    /// Percentage saved, `(1 - compressed / original) * 100`
    pub ratio: f64,

    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,

    pub mode: CompressionMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionOutcome {
    /// A successful conversion with sizes measured from disk.
    pub fn succeeded(
        input: &Path,
        output: &Path,
        original_size: u64,
        compressed_size: u64,
        duration: Duration,
        mode: CompressionMode,
    ) -> Self {
        Self {
            success: true,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            original_size,
            compressed_size,
            ratio: savings_percent(original_size, compressed_size),
            duration,
            mode,
            error: None,
        }
    }

    /// A failed conversion.
    pub fn failed(
        input: &Path,
        output: &Path,
        duration: Duration,
        mode: CompressionMode,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            original_size: 0,
            compressed_size: 0,
            ratio: 0.0,
            duration,
            mode,
            error: Some(error.into()),
        }
    }

    /// File name of the input, for progress output.
    pub fn input_name(&self) -> String {
        self.input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// `(1 - compressed / original) * 100`, or zero when `original` is zero.
pub fn savings_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / original as f64) * 100.0
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

// =============================================================================
// Totals
// =============================================================================

/// Running totals over a sequence of outcomes.
///
/// Only successful outcomes contribute to the byte counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionTotals {
    pub succeeded: usize,
    pub failed: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,

    /// `original_bytes - compressed_bytes`; negative if output grew
    pub saved_bytes: i64,

    /// Overall percentage saved
    pub percent_saved: f64,
}

impl CompressionTotals {
    /// Totals over `outcomes`.
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a ConversionOutcome>) -> Self {
        let mut totals = Self::default();
        for outcome in outcomes {
            totals.record(outcome);
        }
        totals
    }

    /// Fold one outcome into the totals.
    pub fn record(&mut self, outcome: &ConversionOutcome) {
        if !outcome.success {
            self.failed += 1;
            return;
        }

        self.succeeded += 1;
        self.original_bytes += outcome.original_size;
        self.compressed_bytes += outcome.compressed_size;
        self.saved_bytes = self.original_bytes as i64 - self.compressed_bytes as i64;
        self.percent_saved = savings_percent(self.original_bytes, self.compressed_bytes);
    }

    /// Number of outcomes recorded.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

// =============================================================================
// Progress
// =============================================================================

/// Progress notification sent after each file is compressed.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// 0-based position of the file
    pub index: usize,

    /// Number of files in the run
    pub total: usize,

    /// Name of the file just processed
    pub file_name: &'a str,

    /// Its outcome
    pub outcome: &'a ConversionOutcome,
}
