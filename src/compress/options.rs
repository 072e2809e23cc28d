//! Compression options and encoder argument construction.
//!
//! The encoder is KTX-Software's `toktx`. Options map onto its flags
//! deterministically; ETC1S and UASTC select mutually exclusive flag sets
//! and are never mixed in one invocation.
//!
//! ```text
//! ETC1S:  --t2 --encode etc1s --clevel <level> --qlevel <quality>
//!         --max_endpoints 16128 --max_selectors 16128 [...] <out> <in>
//! UASTC:  --t2 --encode uastc --uastc_quality 2 --zcmp 18 [...] <out> <in>
//! ```

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default ETC1S quality level (1-255).
pub const DEFAULT_QUALITY: u32 = 128;

/// Minimum ETC1S quality level.
pub const MIN_QUALITY: u32 = 1;

/// Maximum ETC1S quality level.
pub const MAX_QUALITY: u32 = 255;

/// Default ETC1S compression effort level (0-5).
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 2;

/// Maximum ETC1S compression effort level.
pub const MAX_COMPRESSION_LEVEL: u32 = 5;

/// Endpoint and selector codebook cap used for ETC1S.
pub const ETC1S_MAX_CODEBOOK: u32 = 16128;

/// UASTC quality level (0 fastest, 4 slowest).
pub const UASTC_QUALITY: u32 = 2;

/// Zstandard supercompression level applied to UASTC output.
pub const UASTC_ZSTD_LEVEL: u32 = 18;

// =============================================================================
// Compression Mode
// =============================================================================

/// Basis Universal encoding mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Small files, lower quality
    #[default]
    Etc1s,
    /// Larger files, near-lossless
    Uastc,
}

impl CompressionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionMode::Etc1s => "etc1s",
            CompressionMode::Uastc => "uastc",
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "etc1s" => Ok(CompressionMode::Etc1s),
            "uastc" => Ok(CompressionMode::Uastc),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

// =============================================================================
// Compression Options
// =============================================================================

/// Settings for one encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Encoding mode
    pub mode: CompressionMode,

    /// ETC1S quality level (1-255), ignored for UASTC
    pub quality: u32,

    /// ETC1S compression effort (0-5), ignored for UASTC
    pub compression_level: u32,

    /// Generate a full mipmap chain
    pub mipmaps: bool,

    /// Treat input as a tangent-space normal map
    pub normal_map: bool,

    /// Encoder thread count; `None` lets the tool use every core
    pub threads: Option<u32>,

    /// Explicit encoder binary; `None` searches the executable path
    pub tool_path: Option<PathBuf>,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            mode: CompressionMode::default(),
            quality: DEFAULT_QUALITY,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            mipmaps: false,
            normal_map: false,
            threads: None,
            tool_path: None,
        }
    }
}

impl CompressionOptions {
    /// Options for the given mode with every other field at its default.
    pub fn with_mode(mode: CompressionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Check value ranges. Run before any I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(ConfigError::InvalidQuality(self.quality));
        }
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(ConfigError::InvalidCompressionLevel(
                self.compression_level,
            ));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidThreads);
        }
        Ok(())
    }

    /// Encoder flags, without the positional paths.
    pub fn encoder_flags(&self) -> Vec<String> {
        let mut flags = vec!["--t2".to_string(), "--encode".to_string()];

        match self.mode {
            CompressionMode::Etc1s => {
                flags.extend([
                    "etc1s".to_string(),
                    "--clevel".to_string(),
                    self.compression_level.to_string(),
                    "--qlevel".to_string(),
                    self.quality.to_string(),
                    "--max_endpoints".to_string(),
                    ETC1S_MAX_CODEBOOK.to_string(),
                    "--max_selectors".to_string(),
                    ETC1S_MAX_CODEBOOK.to_string(),
                ]);
                if self.normal_map {
                    flags.push("--normal_mode".to_string());
                }
            }
            CompressionMode::Uastc => {
                flags.extend([
                    "uastc".to_string(),
                    "--uastc_quality".to_string(),
                    UASTC_QUALITY.to_string(),
                    "--zcmp".to_string(),
                    UASTC_ZSTD_LEVEL.to_string(),
                ]);
            }
        }

        if self.normal_map {
            flags.extend(["--assign_oetf".to_string(), "linear".to_string()]);
        }
        if self.mipmaps {
            flags.push("--genmipmap".to_string());
        }
        if let Some(threads) = self.threads {
            flags.extend(["--threads".to_string(), threads.to_string()]);
        }

        flags
    }

    /// Full argument vector: flags, then the output path, then the input path.
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self
            .encoder_flags()
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(output.as_os_str().to_os_string());
        args.push(input.as_os_str().to_os_string());
        args
    }
}

// =============================================================================
// Tests
// =============================================================================
