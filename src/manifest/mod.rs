//! Tile-set manifest.
//!
//! The manifest (`metadata.json`) is the durable contract between this tool
//! and runtime texture loaders. One manifest describes exactly one tiling
//! operation:
//!
//! ```text
//! {
//!   "version": 1,
//!   "width": 2048, "height": 1536,
//!   "tileWidth": 1024, "tileHeight": 1024,
//!   "columns": 2, "rows": 2,
//!   "format": "ktx2",
//!   "chunks": [
//!     { "id": "0_0", "col": 0, "row": 0, "x": 0, "y": 0,
//!       "width": 1024, "height": 1024, "file": "0_0.ktx2" },
//!     ...
//!   ]
//! }
//! ```
//!
//! # Lifecycle
//!
//! 1. Built right after materialization with `format: "png"` and persisted,
//!    so an interrupted run can be inspected.
//! 2. Mutated in place as each tile compresses successfully (chunk file
//!    renamed to `.ktx2`).
//! 3. Persisted again with `format: "ktx2"`. Only this final write is
//!    canonical; chunks still ending in `.png` are tiles that failed.

mod model;
mod store;

pub use model::{Manifest, TileFile, MANIFEST_VERSION};
pub use store::{load, manifest_path, persist, MANIFEST_FILE_NAME};
