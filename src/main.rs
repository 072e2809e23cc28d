//! KTX Tiler - split large images into KTX2 texture tiles.
//!
//! This binary wires the CLI to the tiling pipeline and the batch converter.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ktx_tiler::{
    compress::{compress_directory, CompressionOptions, ProcessBackend, Progress, TileCompressor},
    config::{CheckConfig, Cli, Command, ConvertConfig, TileConfig},
    pipeline::default_pipeline,
    CompressionTotals,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Tile(config) => {
            init_logging(cli.verbose);
            run_tile(config).await
        }
        Command::Convert(config) => {
            init_logging(cli.verbose);
            run_convert(config).await
        }
        Command::Check(config) => {
            if cli.verbose {
                init_logging(true);
            }
            run_check(config).await
        }
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ktx_tiler=debug"
    } else {
        "ktx_tiler=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn log_progress(progress: Progress<'_>) {
    if progress.outcome.success {
        info!(
            "  [{}/{}] {} ({:.1}% saved)",
            progress.index + 1,
            progress.total,
            progress.file_name,
            progress.outcome.ratio
        );
    } else {
        warn!(
            "  [{}/{}] {} FAILED: {}",
            progress.index + 1,
            progress.total,
            progress.file_name,
            progress.outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
}

fn log_totals(totals: &CompressionTotals) {
    info!("────────────────────────────────────────────────────────────────");
    info!("  Succeeded: {}", totals.succeeded);
    info!("  Failed:    {}", totals.failed);
    info!(
        "  Size:      {:.2} MB -> {:.2} MB ({:.1}% saved)",
        to_mb(totals.original_bytes),
        to_mb(totals.compressed_bytes),
        totals.percent_saved
    );
    info!("────────────────────────────────────────────────────────────────");
}

fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

// =============================================================================
// Tile Command
// =============================================================================

async fn run_tile(config: TileConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = match config.encoder.to_options() {
        Ok(options) => options,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let output_dir = config.output_dir();

    info!("Configuration:");
    info!("  Input: {}", config.input.display());
    info!("  Output: {}", output_dir.display());
    info!("  Tile size: {}px", config.tile_size);
    info!("  Mode: {}", options.mode);

    let pipeline = match default_pipeline(config.tile_size, options) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = match pipeline
        .run_with_progress(&config.input, &output_dir, log_progress)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            error!("Tiling failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log_totals(&report.totals);
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    for tile in report.failed_tiles() {
        error!("  Tile {} was not compressed", tile.id);
    }

    if config.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// =============================================================================
// Convert Command
// =============================================================================

async fn run_convert(config: ConvertConfig) -> ExitCode {
    let options = match config.encoder.to_options() {
        Ok(options) => options,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let compressor = match TileCompressor::from_options(options) {
        Ok(compressor) => compressor,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let is_dir = match tokio::fs::metadata(&config.input).await {
        Ok(meta) => meta.is_dir(),
        Err(e) => {
            error!("Cannot read {}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if is_dir {
        convert_directory(&compressor, &config.input, config.output.as_deref()).await
    } else {
        let outcome = compressor
            .convert_file(&config.input, config.output.as_deref())
            .await;

        if outcome.success {
            info!(
                "Converted {} -> {} ({} -> {} bytes, {:.1}% saved, {:?})",
                outcome.input.display(),
                outcome.output.display(),
                outcome.original_size,
                outcome.compressed_size,
                outcome.ratio,
                outcome.duration
            );
            ExitCode::SUCCESS
        } else {
            error!(
                "Conversion failed: {}",
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            ExitCode::FAILURE
        }
    }
}

async fn convert_directory(
    compressor: &TileCompressor<ProcessBackend>,
    input: &Path,
    output: Option<&Path>,
) -> ExitCode {
    let summary = match compress_directory(compressor, input, output, log_progress).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if summary.outcomes.is_empty() {
        warn!("No PNG files found in {}", input.display());
        return ExitCode::SUCCESS;
    }

    log_totals(&summary.totals);
    for failure in summary.failures() {
        error!(
            "  {}: {}",
            failure.input_name(),
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    println!("KTX Tiler Encoder Check");
    println!("═══════════════════════");
    println!();

    let backend = match ProcessBackend::locate(config.toktx.as_deref()) {
        Ok(backend) => {
            println!("✓ Binary: {}", backend.program().display());
            backend
        }
        Err(e) => {
            println!("✗ Binary: {}", e);
            println!();
            println!("Install KTX-Software (https://github.com/KhronosGroup/KTX-Software)");
            println!("or pass --toktx <path>.");
            return ExitCode::FAILURE;
        }
    };

    let compressor = match TileCompressor::new(backend, CompressionOptions::default()) {
        Ok(compressor) => compressor,
        Err(e) => {
            println!("✗ Options: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match compressor.check().await {
        Ok(version) => {
            println!("✓ Version: {}", version);
        }
        Err(e) => {
            println!("✗ Version: {}", e);
            return ExitCode::FAILURE;
        }
    }

    println!();
    println!("═══════════════════════");
    println!("✓ Encoder is ready");

    ExitCode::SUCCESS
}
