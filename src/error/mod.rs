//! # Error Module
//!
//! Error types for the archive steward.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths and what went wrong
//! - **Single-file operations fail fast** with an [`ArchiveError`]
//! - **Bulk scans keep going** and collect [`ScanWarning`]s

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error for every archive operation
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Unsupported checksum algorithm: {name} (expected md5, sha1 or sha256)")]
    UnsupportedAlgorithm { name: String },

    #[error("Unknown metadata field: {name}")]
    UnknownField { name: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArchiveError {
    /// Wrap an I/O error, classifying a missing path as [`ArchiveError::NotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            ArchiveError::NotFound { path }
        } else {
            ArchiveError::Io { path, source }
        }
    }

    /// True when the error means the path was absent at the time of the operation
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArchiveError::NotFound { .. })
    }
}

/// A recoverable problem met during a bulk scan.
///
/// The scan logs it, records it here and moves on to the next entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

impl ScanWarning {
    pub fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl From<&ArchiveError> for ScanWarning {
    fn from(error: &ArchiveError) -> Self {
        let path = match error {
            ArchiveError::NotFound { path } | ArchiveError::Io { path, .. } => path.clone(),
            _ => PathBuf::new(),
        };
        Self {
            path,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ArchiveError>;
