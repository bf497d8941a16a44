//! Error types for combatlog-stream.
//!
//! Every failure a stream can report is a [`LogError`]. Source failures
//! (open or read) are terminal: a stream that yields an error yields nothing
//! afterwards.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Primary error type for combatlog-stream operations.
#[derive(Error, Debug)]
pub enum LogError {
    /// Log file not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Permission denied when opening the log file.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line is not valid UTF-8 and could not be read as text.
    #[error("Invalid UTF-8 at line {line}")]
    InvalidEncoding {
        /// Raw 1-based file position of the line.
        line: usize,
        /// Underlying I/O error reported by the reader.
        #[source]
        source: std::io::Error,
    },

    /// A line does not have the expected shape (strict mode only).
    #[error("Malformed line {line}: {reason}")]
    MalformedLine {
        /// Reported line number, as it would appear on the event.
        line: usize,
        /// What was missing.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },
}

impl LogError {
    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Map a failure to open `path` onto the most specific variant.
    #[must_use]
    pub fn open(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::io(format!("Failed to open {}", path.display()), source),
        }
    }

    /// Map a failure while reading raw line `line`.
    #[must_use]
    pub fn read(line: usize, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::InvalidData {
            Self::InvalidEncoding { line, source }
        } else {
            Self::io(format!("Failed to read line {line}"), source)
        }
    }

    /// Check whether the underlying source could not be opened or read.
    #[must_use]
    pub const fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::PermissionDenied { .. }
                | Self::IoError { .. }
                | Self::InvalidEncoding { .. }
        )
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedLine { .. } => exit_codes::EXIT_PARSE_ERROR,
            Self::FileNotFound { .. } => exit_codes::EXIT_FILE_NOT_FOUND,
            Self::PermissionDenied { .. } => exit_codes::EXIT_PERMISSION_DENIED,
            Self::InvalidConfig { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::InvalidEncoding { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
        }
    }
}

/// Result type alias for combatlog-stream operations.
pub type Result<T> = std::result::Result<T, LogError>;

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Strict-mode parse failure.
    pub const EXIT_PARSE_ERROR: i32 = 2;
    /// Log file not found.
    pub const EXIT_FILE_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}
