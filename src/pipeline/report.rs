//! The summary returned by a pipeline run.

use serde::Serialize;

use crate::compress::{CompressionTotals, ConversionOutcome};
use crate::manifest::{Manifest, TileFile};

/// Summary of one pipeline run.
///
/// `outcomes[i]` is the compression outcome of `manifest.chunks[i]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    /// The final, persisted manifest
    pub manifest: Manifest,

    /// One outcome per tile, in manifest order
    pub outcomes: Vec<ConversionOutcome>,

    /// Byte counts over successful tiles
    pub totals: CompressionTotals,

    /// Non-fatal problems, e.g. intermediate files that could not be removed
    pub warnings: Vec<String>,
}

impl AggregateReport {
    pub fn has_failures(&self) -> bool {
        self.totals.has_failures()
    }

    pub fn total_original(&self) -> u64 {
        self.totals.original_bytes
    }

    pub fn total_compressed(&self) -> u64 {
        self.totals.compressed_bytes
    }

    pub fn total_saved(&self) -> i64 {
        self.totals.saved_bytes
    }

    /// Overall percentage saved across successful tiles.
    pub fn compression_ratio(&self) -> f64 {
        self.totals.percent_saved
    }

    /// Manifest entries paired with their outcomes.
    pub fn tiles(&self) -> impl Iterator<Item = (&TileFile, &ConversionOutcome)> {
        self.manifest.chunks.iter().zip(self.outcomes.iter())
    }

    /// Manifest entries whose compression failed.
    pub fn failed_tiles(&self) -> impl Iterator<Item = &TileFile> {
        self.tiles()
            .filter(|(_, outcome)| !outcome.success)
            .map(|(tile, _)| tile)
    }
}
