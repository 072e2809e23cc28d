//! Encoder process invocation.
//!
//! [`EncoderBackend`] is the seam between the compressor and the external
//! `toktx` binary. [`ProcessBackend`] resolves the binary with `which` and
//! runs it as a child process, capturing exit code and output.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ToolError;

/// Name of the encoder binary searched for on the executable path.
pub const DEFAULT_TOOL_BINARY: &str = "toktx";

/// Captured result of one encoder invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

impl ToolOutput {
    /// Output of a process that exited with status 0.
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    /// Output of a process that exited with `code` and printed `stderr`.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// Whether the process exited with status 0.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into a [`ToolError::Failed`].
    pub fn into_result(self) -> Result<Self, ToolError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ToolError::Failed {
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs the external encoder.
///
/// This is the only seam between the crate and the encoder process, which
/// lets the compressor and pipeline be exercised with fakes. Implementations
/// block the caller until the invocation has finished.
#[async_trait]
pub trait EncoderBackend: Send + Sync {
    /// Run the encoder with `args` and wait for it to exit.
    ///
    /// A non-zero exit is reported through [`ToolOutput::code`], not as an
    /// error. Errors mean the process could not be run at all.
    async fn invoke(&self, args: &[OsString]) -> Result<ToolOutput, ToolError>;
}

// =============================================================================
// Process Backend
// =============================================================================

/// Runs the encoder binary as a child process.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    program: PathBuf,
}

impl ProcessBackend {
    /// Use `program` as-is; spawn errors surface on invocation.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the encoder binary, failing if it cannot be found.
    ///
    /// An explicit path must exist. Otherwise the executable search path is
    /// consulted for [`DEFAULT_TOOL_BINARY`].
    pub fn locate(explicit: Option<&Path>) -> Result<Self, ToolError> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(Self::new(path));
            }
            return which::which(path)
                .map(Self::new)
                .map_err(|_| ToolError::NotFound(path.display().to_string()));
        }

        which::which(DEFAULT_TOOL_BINARY)
            .map(Self::new)
            .map_err(|e| ToolError::NotFound(format!("{} ({})", DEFAULT_TOOL_BINARY, e)))
    }

    /// Resolve the encoder binary, falling back to the bare name.
    ///
    /// Used by batch runs, where a missing binary must show up as per-file
    /// failures rather than aborting.
    pub fn locate_or_default(explicit: Option<&Path>) -> Self {
        Self::locate(explicit).unwrap_or_else(|_| match explicit {
            Some(path) => Self::new(path),
            None => Self::new(DEFAULT_TOOL_BINARY),
        })
    }

    /// The program that will be spawned.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl EncoderBackend for ProcessBackend {
    async fn invoke(&self, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        debug!("Running {} {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ToolError::Spawn {
                program: self.program.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
