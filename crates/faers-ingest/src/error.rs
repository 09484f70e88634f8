//! Error types for quarterly dump ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating and reading quarterly dumps.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Raw-data root directory absent or not a directory.
    #[error("raw data directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to stat or open a source file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited reader failed on a record.
    #[error("failed to parse delimited file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Quarter folder has no `ascii` subdirectory.
    #[error("no ascii subdirectory in quarter folder {path}")]
    AsciiDirMissing { path: PathBuf },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
