//! Pipeline integration tests.
//!
//! Tests verify:
//! - End-to-end tiling of a non-square image with clipped edge tiles
//! - Partial compression failure is recorded without aborting
//! - Tiles are compressed in manifest order, one at a time
//! - The intermediate manifest is on disk while compression runs
//! - Fatal errors (unreadable source, extraction failure, bad tile size)

use std::cell::RefCell;
use std::path::Path;

use ktx_tiler::bitmap::ImageBitmap;
use ktx_tiler::compress::{CompressionOptions, TileCompressor};
use ktx_tiler::error::{ConfigError, PipelineError};
use ktx_tiler::manifest;
use ktx_tiler::pipeline::{Pipeline, INTERMEDIATE_DIR_NAME};
use ktx_tiler::tile::TileFormat;

use super::test_utils::{fake_pipeline, list_dir, write_png, FakeBitmap, FakeEncoder};

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn test_end_to_end_2048x1536() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tiles");
    let pipeline = fake_pipeline(FakeBitmap::new(2048, 1536), FakeEncoder::new(), 1024);

    let report = pipeline.run(Path::new("world.png"), &out).await.unwrap();

    let manifest = &report.manifest;
    assert_eq!((manifest.columns, manifest.rows), (2, 2));
    assert_eq!(manifest.len(), 4);
    assert_eq!(manifest.format, TileFormat::Ktx2);

    let last = &manifest.chunks[3];
    assert_eq!((last.col, last.row), (1, 1));
    assert_eq!((last.x, last.y), (1024, 1024));
    assert_eq!((last.width, last.height), (1024, 512));
    assert_eq!(last.file, "1_1.ktx2");

    assert_eq!(report.outcomes.len(), 4);
    assert!(report.outcomes.iter().all(|o| o.success));
    assert!(!report.has_failures());
    assert!(report.warnings.is_empty());

    // Intermediates are gone; only compressed tiles and the manifest remain.
    assert_eq!(
        list_dir(&out),
        vec!["0_0.ktx2", "0_1.ktx2", "1_0.ktx2", "1_1.ktx2", "metadata.json"]
    );

    let persisted = manifest::load(&out).unwrap();
    assert_eq!(&persisted, manifest);
}

#[tokio::test]
async fn test_totals_match_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = fake_pipeline(FakeBitmap::new(25, 10), FakeEncoder::new(), 10);

    let report = pipeline.run(Path::new("in.png"), dir.path()).await.unwrap();

    // Tiles are 100, 100 and 50 bytes; the fake encoder quarters them.
    let sizes: Vec<(u64, u64)> = report
        .outcomes
        .iter()
        .map(|o| (o.original_size, o.compressed_size))
        .collect();
    assert_eq!(sizes, vec![(100, 25), (100, 25), (50, 12)]);

    assert_eq!(report.total_original(), 250);
    assert_eq!(report.total_compressed(), 62);
    assert_eq!(report.total_saved(), 188);
    let expected = (1.0 - 62.0 / 250.0) * 100.0;
    assert!((report.compression_ratio() - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_image_smaller_than_tile_yields_one_tile() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = fake_pipeline(FakeBitmap::new(300, 200), FakeEncoder::new(), 1024);

    let report = pipeline.run(Path::new("small.png"), dir.path()).await.unwrap();

    assert_eq!(report.manifest.len(), 1);
    assert_eq!(pipeline.bitmap().crops(), vec![(0, 0, 300, 200)]);
    assert_eq!(report.manifest.chunks[0].file, "0_0.ktx2");
}

// =============================================================================
// Partial Failure
// =============================================================================

#[tokio::test]
async fn test_partial_compression_failure() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = FakeEncoder::new().failing_on("1_0.png");
    let pipeline = fake_pipeline(FakeBitmap::new(30, 10), encoder, 10);

    let report = pipeline.run(Path::new("strip.png"), dir.path()).await.unwrap();

    let flags: Vec<bool> = report.outcomes.iter().map(|o| o.success).collect();
    assert_eq!(flags, vec![true, false, true]);

    let failed = &report.outcomes[1];
    assert_eq!(failed.original_size, 0);
    assert_eq!(failed.compressed_size, 0);
    assert_eq!(failed.ratio, 0.0);
    assert!(failed.error.as_deref().unwrap().contains("simulated encoder failure"));

    // Totals only count the two successes.
    assert_eq!(report.totals.succeeded, 2);
    assert_eq!(report.totals.failed, 1);
    assert_eq!(report.total_original(), 200);
    assert_eq!(report.total_compressed(), 50);
    assert_eq!(report.total_saved(), 150);
    assert!((report.compression_ratio() - 75.0).abs() < 1e-9);
    assert!(report.has_failures());

    // The failed entry keeps its intermediate name.
    let files: Vec<&str> = report
        .manifest
        .chunks
        .iter()
        .map(|c| c.file.as_str())
        .collect();
    assert_eq!(files, vec!["0_0.ktx2", "1_0.png", "2_0.ktx2"]);
    assert_eq!(report.manifest.format, TileFormat::Ktx2);

    let failed_ids: Vec<&str> = report.failed_tiles().map(|t| t.id.as_str()).collect();
    assert_eq!(failed_ids, vec!["1_0"]);

    // The final manifest on disk matches, and intermediates were still removed.
    let persisted = manifest::load(dir.path()).unwrap();
    assert_eq!(persisted.chunks[1].file, "1_0.png");
    assert_eq!(persisted.mismatched_chunks().count(), 1);
    assert!(!dir.path().join(INTERMEDIATE_DIR_NAME).exists());
}

#[tokio::test]
async fn test_every_tile_failing_still_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = FakeEncoder::new()
        .failing_on("0_0.png")
        .failing_on("0_1.png");
    let pipeline = fake_pipeline(FakeBitmap::new(10, 20), encoder, 10);

    let report = pipeline.run(Path::new("in.png"), dir.path()).await.unwrap();

    assert_eq!(report.totals.failed, 2);
    assert_eq!(report.total_original(), 0);
    assert_eq!(report.compression_ratio(), 0.0);
    assert_eq!(manifest::load(dir.path()).unwrap().format, TileFormat::Ktx2);
}

#[tokio::test]
async fn test_tile_from_earlier_run_is_not_reused() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("0_0.ktx2"), b"earlier").unwrap();

    let encoder = FakeEncoder::new().silent_on("0_0.png");
    let pipeline = fake_pipeline(FakeBitmap::new(20, 10), encoder, 10);

    let report = pipeline.run(Path::new("in.png"), dir.path()).await.unwrap();

    let flags: Vec<(bool, u64)> = report
        .outcomes
        .iter()
        .map(|o| (o.success, o.compressed_size))
        .collect();
    assert_eq!(flags, vec![(false, 0), (true, 25)]);
    assert!(report.outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .contains("no output"));

    let persisted = manifest::load(dir.path()).unwrap();
    let files: Vec<&str> = persisted.chunks.iter().map(|c| c.file.as_str()).collect();
    assert_eq!(files, vec!["0_0.png", "1_0.ktx2"]);
    assert!(!dir.path().join("0_0.ktx2").exists());
}

#[tokio::test]
async fn test_cleanup_failure_becomes_warning() {
    let dir = tempfile::tempdir().unwrap();
    let staging = dir.path().join(INTERMEDIATE_DIR_NAME);
    let encoder = FakeEncoder::new().removing_on_first_call(&staging);
    let pipeline = fake_pipeline(FakeBitmap::new(10, 10), encoder, 10);

    let report = pipeline.run(Path::new("in.png"), dir.path()).await.unwrap();

    assert!(report.outcomes[0].success);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains(INTERMEDIATE_DIR_NAME));
    assert!(!report.has_failures());

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(manifest::manifest_path(dir.path())).unwrap())
            .unwrap();
    assert_eq!(json["format"], "ktx2");
    assert_eq!(json["chunks"][0]["file"], "0_0.ktx2");
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_compression_follows_row_major_order_without_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = fake_pipeline(FakeBitmap::new(30, 25), FakeEncoder::new(), 10);

    let report = pipeline.run(Path::new("in.png"), dir.path()).await.unwrap();

    let expected: Vec<String> = report
        .manifest
        .chunks
        .iter()
        .map(|c| format!("{}.png", c.id))
        .collect();
    assert_eq!(
        expected,
        vec![
            "0_0.png", "1_0.png", "2_0.png", "0_1.png", "1_1.png", "2_1.png", "0_2.png",
            "1_2.png", "2_2.png"
        ]
    );

    let encoder = pipeline.compressor().backend();
    assert_eq!(encoder.input_names(), expected);
    assert_eq!(encoder.max_in_flight(), 1);

    // Outcomes line up with manifest entries.
    for (tile, outcome) in report.tiles() {
        assert_eq!(
            outcome.output.file_name().unwrap().to_string_lossy(),
            tile.file
        );
    }
}

#[tokio::test]
async fn test_progress_reports_every_tile_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = FakeEncoder::new().failing_on("1_1.png");
    let pipeline = fake_pipeline(FakeBitmap::new(20, 20), encoder, 10);

    let seen = RefCell::new(Vec::new());
    pipeline
        .run_with_progress(Path::new("in.png"), dir.path(), |progress| {
            seen.borrow_mut().push((
                progress.index,
                progress.total,
                progress.file_name.to_string(),
                progress.outcome.success,
            ));
        })
        .await
        .unwrap();

    assert_eq!(
        seen.into_inner(),
        vec![
            (0, 4, "0_0.ktx2".to_string(), true),
            (1, 4, "1_0.ktx2".to_string(), true),
            (2, 4, "0_1.ktx2".to_string(), true),
            (3, 4, "1_1.png".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn test_intermediate_manifest_visible_during_compression() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = fake_pipeline(FakeBitmap::new(20, 10), FakeEncoder::new(), 10);

    let snapshots = RefCell::new(Vec::new());
    pipeline
        .run_with_progress(Path::new("in.png"), dir.path(), |_| {
            snapshots
                .borrow_mut()
                .push(manifest::load(dir.path()).unwrap());
        })
        .await
        .unwrap();

    for snapshot in snapshots.into_inner() {
        assert_eq!(snapshot.format, TileFormat::Png);
        assert!(snapshot.chunks.iter().all(|c| c.file.ends_with(".png")));
    }
    assert_eq!(manifest::load(dir.path()).unwrap().format, TileFormat::Ktx2);
}

#[tokio::test]
async fn test_rerun_replaces_manifest() {
    let dir = tempfile::tempdir().unwrap();

    let first = fake_pipeline(FakeBitmap::new(100, 100), FakeEncoder::new(), 10);
    first.run(Path::new("in.png"), dir.path()).await.unwrap();
    assert_eq!(manifest::load(dir.path()).unwrap().len(), 100);

    let second = fake_pipeline(FakeBitmap::new(100, 100), FakeEncoder::new(), 50);
    second.run(Path::new("in.png"), dir.path()).await.unwrap();

    let manifest = manifest::load(dir.path()).unwrap();
    assert_eq!(manifest.len(), 4);
    assert_eq!(manifest.tile_width, 50);
}

// =============================================================================
// Fatal Errors
// =============================================================================

#[tokio::test]
async fn test_unreadable_source_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = fake_pipeline(FakeBitmap::unreadable(), FakeEncoder::new(), 10);

    let result = pipeline.run(Path::new("missing.png"), dir.path()).await;

    assert!(matches!(result, Err(PipelineError::SourceRead { .. })));
    assert!(!manifest::manifest_path(dir.path()).exists());
    assert!(pipeline.compressor().backend().invocations().is_empty());
}

#[tokio::test]
async fn test_extraction_failure_aborts_before_compression() {
    let dir = tempfile::tempdir().unwrap();
    let bitmap = FakeBitmap::new(30, 10).failing_at(10, 0);
    let pipeline = fake_pipeline(bitmap, FakeEncoder::new(), 10);

    let result = pipeline.run(Path::new("in.png"), dir.path()).await;

    match result {
        Err(PipelineError::Extraction { tile, .. }) => assert_eq!(tile, "1_0"),
        other => panic!("Expected Extraction error, got {:?}", other),
    }
    assert!(!manifest::manifest_path(dir.path()).exists());
    assert!(pipeline.compressor().backend().invocations().is_empty());
}

#[tokio::test]
async fn test_unwritable_manifest_aborts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(manifest::manifest_path(dir.path())).unwrap();
    let pipeline = fake_pipeline(FakeBitmap::new(20, 10), FakeEncoder::new(), 10);

    let result = pipeline.run(Path::new("in.png"), dir.path()).await;

    match result {
        Err(PipelineError::Persistence { path, .. }) => assert!(path.ends_with("metadata.json")),
        other => panic!("Expected Persistence error, got {:?}", other),
    }
    assert!(pipeline.compressor().backend().invocations().is_empty());
}

#[test]
fn test_zero_tile_size_rejected() {
    let compressor = TileCompressor::new(FakeEncoder::new(), CompressionOptions::default()).unwrap();
    let result = Pipeline::new(FakeBitmap::new(10, 10), compressor, 0);
    assert!(matches!(result, Err(ConfigError::InvalidTileSize(0))));
}

// =============================================================================
// Real Bitmap Source
// =============================================================================

#[tokio::test]
async fn test_image_bitmap_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_png(dir.path(), "gradient.png", 40, 24);
    let out = dir.path().join("out");

    let compressor = TileCompressor::new(FakeEncoder::new(), CompressionOptions::default()).unwrap();
    let pipeline = Pipeline::new(ImageBitmap::new(), compressor, 16).unwrap();

    let report = pipeline.run(&source, &out).await.unwrap();

    assert_eq!((report.manifest.columns, report.manifest.rows), (3, 2));
    assert!(report.outcomes.iter().all(|o| o.success && o.original_size > 0));

    let last = &report.manifest.chunks[5];
    assert_eq!((last.x, last.y, last.width, last.height), (32, 16, 8, 8));
    assert!(out.join("2_1.ktx2").exists());
    assert!(!out.join(INTERMEDIATE_DIR_NAME).exists());
}

#[tokio::test]
async fn test_image_bitmap_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let compressor = TileCompressor::new(FakeEncoder::new(), CompressionOptions::default()).unwrap();
    let pipeline = Pipeline::new(ImageBitmap::new(), compressor, 16).unwrap();

    let result = pipeline
        .run(&dir.path().join("nope.png"), &dir.path().join("out"))
        .await;

    assert!(matches!(result, Err(PipelineError::SourceRead { .. })));
}
