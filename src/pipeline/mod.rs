//! Tiling pipeline.
//!
//! Sequences the grid partitioner, the tile materializer, the manifest
//! store and the compressor into one run, and aggregates the per-tile
//! outcomes into an [`AggregateReport`].
//!
//! # Failure Handling
//!
//! | Phase       | Failure                          | Effect                       |
//! |-------------|----------------------------------|------------------------------|
//! | Partition   | bad tile size, unreadable source | run fails                    |
//! | Materialize | tile crop or write fails         | run fails                    |
//! | Compress    | encoder fails for a tile         | recorded, run continues      |
//! | Finalize    | intermediate cleanup fails       | warning on the report        |
//! | Finalize    | manifest write fails             | run fails                    |
//!
//! A tile whose compression failed keeps its `.png` file name in the final
//! manifest even though the intermediate file is removed; loaders should
//! treat such chunks as missing.

mod orchestrator;
mod report;

pub use orchestrator::{
    default_pipeline, run, Pipeline, DEFAULT_TILE_SIZE, INTERMEDIATE_DIR_NAME,
};
pub use report::AggregateReport;
