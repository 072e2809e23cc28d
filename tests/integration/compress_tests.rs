//! Batch conversion integration tests.
//!
//! Tests verify:
//! - Directory conversion order, filtering and progress reporting
//! - Failure aggregation across a batch
//! - Output directory handling
//! - Encoder arguments for each mode

use std::path::Path;

use ktx_tiler::compress::{
    compress_directory, CompressionMode, CompressionOptions, TileCompressor,
};
use ktx_tiler::error::PipelineError;

use super::test_utils::{list_dir, write_bytes, FakeEncoder};

fn compressor(encoder: FakeEncoder) -> TileCompressor<FakeEncoder> {
    TileCompressor::new(encoder, CompressionOptions::default()).unwrap()
}

// =============================================================================
// Directory Conversion
// =============================================================================

#[tokio::test]
async fn test_directory_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    write_bytes(dir.path(), "c.PNG", 40);
    write_bytes(dir.path(), "a.png", 400);
    write_bytes(dir.path(), "notes.txt", 10);
    write_bytes(dir.path(), "b.png", 80);
    std::fs::create_dir(dir.path().join("nested.png")).unwrap();

    let compressor = compressor(FakeEncoder::new());
    let mut seen = Vec::new();
    let summary = compress_directory(&compressor, dir.path(), None, |progress| {
        seen.push((progress.index, progress.total, progress.file_name.to_string()));
    })
    .await
    .unwrap();

    assert_eq!(
        seen,
        vec![
            (0, 3, "a.png".to_string()),
            (1, 3, "b.png".to_string()),
            (2, 3, "c.PNG".to_string()),
        ]
    );
    assert_eq!(
        compressor.backend().input_names(),
        vec!["a.png", "b.png", "c.PNG"]
    );
    assert_eq!(compressor.backend().max_in_flight(), 1);

    assert!(!summary.has_failures());
    assert_eq!(summary.totals.succeeded, 3);
    assert_eq!(summary.totals.original_bytes, 520);
    assert_eq!(summary.totals.compressed_bytes, 130);
    assert_eq!(summary.totals.saved_bytes, 390);

    // Outputs land next to the inputs.
    assert!(dir.path().join("a.ktx2").exists());
    assert!(dir.path().join("c.ktx2").exists());
}

#[tokio::test]
async fn test_directory_into_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out").join("ktx");
    std::fs::create_dir(&input).unwrap();
    write_bytes(&input, "one.png", 64);
    write_bytes(&input, "two.png", 64);

    let compressor = compressor(FakeEncoder::new());
    let summary = compress_directory(&compressor, &input, Some(&output), |_| {})
        .await
        .unwrap();

    assert_eq!(summary.outcomes.len(), 2);
    assert_eq!(list_dir(&output), vec!["one.ktx2", "two.ktx2"]);
    assert_eq!(list_dir(&input), vec!["one.png", "two.png"]);
}

#[tokio::test]
async fn test_directory_failures_are_aggregated() {
    let dir = tempfile::tempdir().unwrap();
    write_bytes(dir.path(), "a.png", 100);
    write_bytes(dir.path(), "b.png", 100);
    write_bytes(dir.path(), "c.png", 100);

    let compressor = compressor(FakeEncoder::new().failing_on("b.png"));
    let summary = compress_directory(&compressor, dir.path(), None, |_| {})
        .await
        .unwrap();

    assert!(summary.has_failures());
    assert_eq!(summary.totals.succeeded, 2);
    assert_eq!(summary.totals.failed, 1);
    assert_eq!(summary.totals.original_bytes, 200);
    assert!((summary.totals.percent_saved - 75.0).abs() < 1e-9);

    let failures: Vec<String> = summary.failures().map(|o| o.input_name()).collect();
    assert_eq!(failures, vec!["b.png"]);
    assert!(!dir.path().join("b.ktx2").exists());
}

#[tokio::test]
async fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();

    let compressor = compressor(FakeEncoder::new());
    let summary = compress_directory(&compressor, dir.path(), None, |_| {})
        .await
        .unwrap();

    assert!(summary.outcomes.is_empty());
    assert_eq!(summary.totals.total(), 0);
    assert_eq!(summary.totals.percent_saved, 0.0);
    assert!(compressor.backend().invocations().is_empty());
}

#[tokio::test]
async fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();

    let compressor = compressor(FakeEncoder::new());
    let result =
        compress_directory(&compressor, &dir.path().join("absent"), None, |_| {}).await;

    assert!(matches!(result, Err(PipelineError::SourceRead { .. })));
}

// =============================================================================
// Single Files
// =============================================================================

#[tokio::test]
async fn test_convert_file_creates_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bytes(dir.path(), "albedo.png", 256);
    let output_dir = dir.path().join("converted");

    let compressor = compressor(FakeEncoder::new());
    let outcome = compressor.convert_file(&input, Some(&output_dir)).await;

    assert!(outcome.success);
    assert_eq!(outcome.output, output_dir.join("albedo.ktx2"));
    assert_eq!(outcome.original_size, 256);
    assert_eq!(outcome.compressed_size, 64);
    assert!((outcome.ratio - 75.0).abs() < 1e-9);
    assert_eq!(list_dir(&output_dir), vec!["albedo.ktx2"]);
}

#[tokio::test]
async fn test_convert_file_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bytes(dir.path(), "height.png", 16);

    let compressor = compressor(FakeEncoder::new());
    let outcome = compressor.convert_file(&input, None).await;

    assert!(outcome.success);
    assert_eq!(outcome.output, dir.path().join("height.ktx2"));
}

// =============================================================================
// Encoder Arguments
// =============================================================================

#[tokio::test]
async fn test_uastc_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bytes(dir.path(), "normal.png", 32);
    let output = dir.path().join("normal.ktx2");

    let options = CompressionOptions {
        mipmaps: true,
        normal_map: true,
        threads: Some(4),
        ..CompressionOptions::with_mode(CompressionMode::Uastc)
    };
    let compressor = TileCompressor::new(FakeEncoder::new(), options).unwrap();
    let outcome = compressor.compress(&input, &output).await;
    assert!(outcome.success);
    assert_eq!(outcome.mode, CompressionMode::Uastc);

    let invocations = compressor.backend().invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0],
        vec![
            "--t2".to_string(),
            "--encode".to_string(),
            "uastc".to_string(),
            "--uastc_quality".to_string(),
            "2".to_string(),
            "--zcmp".to_string(),
            "18".to_string(),
            "--assign_oetf".to_string(),
            "linear".to_string(),
            "--genmipmap".to_string(),
            "--threads".to_string(),
            "4".to_string(),
            output.display().to_string(),
            input.display().to_string(),
        ]
    );
}

#[tokio::test]
async fn test_etc1s_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bytes(dir.path(), "color.png", 32);
    let output = dir.path().join("color.ktx2");

    let options = CompressionOptions {
        quality: 200,
        compression_level: 4,
        ..CompressionOptions::default()
    };
    let compressor = TileCompressor::new(FakeEncoder::new(), options).unwrap();
    compressor.compress(&input, &output).await;

    let args = &compressor.backend().invocations()[0];
    let expected: Vec<&str> = vec![
        "--t2",
        "--encode",
        "etc1s",
        "--clevel",
        "4",
        "--qlevel",
        "200",
        "--max_endpoints",
        "16128",
        "--max_selectors",
        "16128",
    ];
    assert_eq!(&args[..expected.len()], expected.as_slice());
    assert_eq!(args.len(), expected.len() + 2);
    assert!(Path::new(&args[args.len() - 2]).ends_with("color.ktx2"));
}
