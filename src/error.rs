use thiserror::Error;

/// Invalid input detected before any I/O takes place
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Tile edge length must be positive
    #[error("Invalid tile size: {0} (must be greater than 0)")]
    InvalidTileSize(u32),

    /// Image dimensions must be positive
    #[error("Invalid image dimensions: {width}x{height} (both must be greater than 0)")]
    InvalidDimensions { width: u32, height: u32 },

    /// ETC1S quality level out of range
    #[error("Invalid quality: {0} (must be between 1 and 255)")]
    InvalidQuality(u32),

    /// ETC1S compression level out of range
    #[error("Invalid compression level: {0} (must be between 0 and 5)")]
    InvalidCompressionLevel(u32),

    /// Compression mode string is neither `etc1s` nor `uastc`
    #[error("Unknown compression mode: '{0}' (expected 'etc1s' or 'uastc')")]
    UnknownMode(String),

    /// Explicit encoder thread count of zero
    #[error("Invalid thread count: 0 (omit the option to use all cores)")]
    InvalidThreads,

    /// A manifest does not describe a consistent grid
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

/// Errors reported by the bitmap collaborator
#[derive(Debug, Clone, Error)]
pub enum BitmapError {
    /// The source image could not be opened or decoded
    #[error("Cannot read image {path}: {message}")]
    Read { path: String, message: String },

    /// A crop rectangle does not fit inside the source image
    #[error(
        "Region {width}x{height} at ({x}, {y}) exceeds image bounds {image_width}x{image_height}"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// The cropped region could not be written
    #[error("Cannot write tile {path}: {message}")]
    Write { path: String, message: String },
}

/// Errors from the external encoder tool
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// The encoder binary could not be located
    #[error("Encoder binary not found: {0}")]
    NotFound(String),

    /// The process could not be started
    #[error("Failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    /// The process ran but exited unsuccessfully
    #[error("Encoder exited with {}: {stderr}", exit_description(.code))]
    Failed { code: Option<i32>, stderr: String },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Errors while persisting or loading a manifest
#[derive(Debug, Clone, Error)]
pub enum ManifestError {
    /// Filesystem failure
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// JSON encoding or decoding failure
    #[error("JSON error: {0}")]
    Json(String),

    /// The manifest content violates the grid invariants
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Fatal errors that abort a pipeline run.
///
/// Per-tile compression failures are never reported through this type;
/// they are recorded in the run's outcomes instead.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Invalid configuration, detected before any I/O
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The source image is missing or unreadable
    #[error("Source read failed for {path}: {message}")]
    SourceRead { path: String, message: String },

    /// A tile could not be cropped or written
    #[error("Extraction failed for tile {tile}: {message}")]
    Extraction { tile: String, message: String },

    /// A manifest write or output directory operation failed
    #[error("Persistence failed for {path}: {message}")]
    Persistence { path: String, message: String },
}

impl From<ManifestError> for PipelineError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::Invalid(config) => PipelineError::Config(config),
            ManifestError::Io { path, message } => PipelineError::Persistence { path, message },
            ManifestError::Json(message) => PipelineError::Persistence {
                path: crate::manifest::MANIFEST_FILE_NAME.to_string(),
                message,
            },
        }
    }
}
