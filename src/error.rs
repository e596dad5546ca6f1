//! Error types for persistfs
//!
//! One variant per failing operation, each carrying the underlying I/O error
//! unmodified so callers can inspect it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for persistfs operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Storage Root Errors
    // -------------------------------------------------------------------------
    #[error("failed to initialize storage root {path:?}: {source}")]
    Initialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Item Errors
    // -------------------------------------------------------------------------
    #[error("failed to read key {key:?} from {path:?}: {source}")]
    Read {
        key: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write key {key:?} to {path:?}: {source}")]
    Write {
        key: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete key {key:?} at {path:?}: {source}")]
    Delete {
        key: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The codec mapped a key to something other than a plain file name
    /// (empty, absolute, `..`, or containing a path separator)
    #[error("key {key:?} maps to {file_name:?}, which is not a file name inside the storage root")]
    InvalidKey { key: String, file_name: String },

    // -------------------------------------------------------------------------
    // Enumeration Errors
    // -------------------------------------------------------------------------
    #[error("failed to list storage root {path:?}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// First per-key failure seen while clearing; the remaining removals
    /// still ran to completion.
    #[error("failed to clear {failed} of {total} keys: {source}")]
    Clear {
        failed: usize,
        total: usize,
        #[source]
        source: Box<StoreError>,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// The kind of the underlying I/O error, if this error wraps one.
    ///
    /// For `Clear` this is the kind of the first per-key failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            StoreError::Initialization { source, .. }
            | StoreError::Read { source, .. }
            | StoreError::Write { source, .. }
            | StoreError::Delete { source, .. }
            | StoreError::List { source, .. } => Some(source.kind()),
            StoreError::InvalidKey { .. } => Some(io::ErrorKind::InvalidInput),
            StoreError::Clear { source, .. } => source.io_kind(),
            StoreError::Config(_) => None,
        }
    }
}
