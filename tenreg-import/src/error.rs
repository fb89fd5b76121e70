//! Error types for the import pipeline
//!
//! Only run-fatal conditions are represented here. Per-record
//! validation and commit problems are data on the staging record or
//! counters on the final report, never `Err` values.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for import pipeline operations
pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    /// Container file does not exist
    #[error("Import file not found: {0}")]
    FileNotFound(PathBuf),

    /// Container file has the wrong suffix
    #[error("Not a container file (expected .{expected}): {path}")]
    WrongExtension { path: PathBuf, expected: &'static str },

    /// Container cannot be opened or its manifest table is unreadable
    #[error("Corrupt container: {0}")]
    CorruptContainer(String),

    /// Manifest is present but fails the completeness gate
    #[error("Invalid manifest in import file: {0}")]
    InvalidManifest(String),

    /// Operation requires a loaded file
    #[error("No file loaded")]
    NoFileLoaded,

    /// Database error outside the per-record commit boundary
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
