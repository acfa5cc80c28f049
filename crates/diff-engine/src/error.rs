// crates/diff-engine/src/error.rs
//! Error types for marker persistence
//!
//! The diff itself never fails. Only reading or writing the stored marker can.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for diff engine operations
pub type DiffResult<T> = Result<T, DiffError>;

/// Errors that can occur while loading or saving the marker
#[derive(Debug, Error)]
pub enum DiffError {
    /// Failed to read the marker file
    #[error("Failed to read marker file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the marker file
    #[error("Failed to write marker file at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Marker file exists but cannot be decoded
    #[error("Marker file at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing store failure other than file I/O
    #[error("Storage error: {0}")]
    Storage(String),
}
