//! Error and warning types for duplicate removal.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a deduplication run.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Moving a duplicate to the trash failed.
    #[error("Failed to trash {path}: {message}")]
    Trash { path: PathBuf, message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl DedupError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::Walk { path, .. }
            | Self::Trash { path, .. }
            | Self::NotADirectory { path } => Some(path.as_path()),
            Self::InvalidConfig { .. } => None,
        }
    }
}

/// Kind of skipped-file warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a file or directory.
    ReadError,
    /// Error deleting a duplicate.
    DeleteError,
}

/// Non-fatal problem recorded when errors are skipped instead of aborting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl DedupWarning {
    /// Build a warning from an aborting error.
    pub fn from_error(err: &DedupError, kind: WarningKind) -> Self {
        let kind = match err {
            DedupError::PermissionDenied { .. } => WarningKind::PermissionDenied,
            _ => kind,
        };
        Self {
            path: err.path().map(Path::to_path_buf).unwrap_or_default(),
            message: err.to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_error_io() {
        let err = DedupError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, DedupError::PermissionDenied { .. }));
    }

    #[test]
    fn test_warning_from_error() {
        let err = DedupError::io(
            "/test/file",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let warning = DedupWarning::from_error(&err, WarningKind::ReadError);
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert_eq!(warning.path, PathBuf::from("/test/file"));
        assert!(warning.message.contains("Permission denied"));
    }
}
