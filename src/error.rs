use std::path::PathBuf;

use thiserror::Error;

/// Centralized error types for treeidx.
///
/// Structural failures only. A folder that yields no report or has no
/// output directory is a soft skip and never surfaces here.
#[derive(Error, Debug)]
pub enum TreeIndexError {
    /// File system I/O operation failed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Config file exists but its content is malformed
    #[error("malformed config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Config could not be encoded for persistence
    #[error("failed to serialize config: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    /// Config file does not exist
    #[error("config file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Save requested for a config that was never loaded or saved
    #[error("config has no associated file, save it to a path first")]
    NoConfigPath,

    /// Invalid CLI or config value
    #[error("invalid {field}: {value} ({reason})")]
    ConfigInvalid { field: String, value: String, reason: String },

    /// Reports cannot be written at all (e.g. storage is full)
    #[error("report output unavailable at '{}': {source}", path.display())]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Background save worker stopped without reporting an outcome
    #[error("save of '{}' was interrupted", path.display())]
    SaveInterrupted { path: PathBuf },
}

/// Result type alias for treeidx operations.
pub type Result<T> = std::result::Result<T, TreeIndexError>;

/// Exit codes for the CLI application.
///
/// Based on BSD sysexits.h conventions for meaningful exit statuses.
/// Use `ExitCode::into()` to convert to `std::process::ExitCode`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Successful execution
    Ok = 0,
    /// General software error (internal error, unexpected state)
    Software = 1,
    /// Invalid input data (malformed config file)
    DataErr = 2,
    /// I/O error (config unreadable, save failed)
    IoErr = 3,
    /// No input provided (missing config file or path)
    NoInput = 4,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

impl TreeIndexError {
    /// Exit code the CLI reports for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io { .. } | Self::OutputUnavailable { .. } | Self::SaveInterrupted { .. } => {
                ExitCode::IoErr
            }
            Self::Parse { .. } | Self::ConfigInvalid { .. } => ExitCode::DataErr,
            Self::NoConfigPath | Self::ConfigNotFound { .. } => ExitCode::NoInput,
            Self::Serialize { .. } => ExitCode::Software,
        }
    }
}
