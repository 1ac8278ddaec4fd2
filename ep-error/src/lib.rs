//! Unified error handling for Envprint
//!
//! The fingerprint engine itself never fails: unavailable signals turn into
//! sentinels and malformed options turn into defaults. This crate covers the
//! edges that can fail, such as loading an environment snapshot from disk or
//! parsing a hasher name given on the command line.

use std::io;
use std::path::PathBuf;

/// Result type alias using EnvprintError
pub type Result<T> = std::result::Result<T, EnvprintError>;

/// Unified error type for all Envprint operations
#[derive(thiserror::Error, Debug)]
pub enum EnvprintError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // ============================================================================
    // Snapshot and Options Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid environment snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Unknown hasher: {0} (expected one of: sha256, murmur3)")]
    UnknownHasher(String),
}

impl EnvprintError {
    /// Create a snapshot validation error
    pub fn invalid_snapshot(msg: impl Into<String>) -> Self {
        Self::InvalidSnapshot(msg.into())
    }

    /// Create a file read error for the given path
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }
}
