//! Error types for compression operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while compressing an image.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The source could not be decoded as a raster image.
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// JPEG encoding failed.
    #[error("Failed to encode {path} at quality {quality}: {source}")]
    Encode {
        path: PathBuf,
        quality: u8,
        #[source]
        source: image::ImageError,
    },

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

    /// The byte budget must be positive.
    #[error("Invalid size budget: {max_size_bytes} bytes (must be greater than zero)")]
    InvalidBudget { max_size_bytes: u64 },

    /// Folder mode was pointed at something that is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl CompressError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a decode error, unwrapping I/O failures raised by the decoder.
    pub fn decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        match source {
            image::ImageError::IoError(err) => Self::io(path, err),
            source => Self::Decode {
                path: path.into(),
                source,
            },
        }
    }
}
