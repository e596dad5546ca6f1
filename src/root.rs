//! Storage Root Initializer
//!
//! Makes sure the storage directory exists before anything touches it.
//!
//! ## Lifecycle of a [`RootGate`]
//! ```text
//!   Uninitialized ──first caller──▶ Initializing ──ok──▶ Ready
//!         ▲                              │
//!         └────────────failed────────────┘
//! ```
//! Callers arriving while a gate is `Initializing` wait on the same attempt
//! instead of issuing their own `mkdir`. A failed attempt leaves the gate
//! uninitialized so the next caller retries.

use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;

use crate::error::{Result, StoreError};
use crate::fs::FileSystem;

/// Check for the directory and create it if absent
///
/// A directory created concurrently by someone else counts as success.
pub async fn ensure_root<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<()> {
    let init_err = |source: io::Error| StoreError::Initialization {
        path: path.to_path_buf(),
        source,
    };

    if fs.exists(path).await.map_err(init_err)? {
        return Ok(());
    }

    match fs.mkdir(path).await {
        Ok(()) => {
            tracing::info!("Created storage root {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => {
            // Lost a race with another creator
            if fs.exists(path).await.unwrap_or(false) {
                Ok(())
            } else {
                Err(init_err(e))
            }
        }
    }
}

/// Memoized initialization for one storage path
#[derive(Debug)]
pub struct RootGate {
    path: PathBuf,
    ready: OnceCell<()>,
}

impl RootGate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ready: OnceCell::new(),
        }
    }

    /// Path this gate initializes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether initialization has completed successfully
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// Wait until the root exists, running initialization at most once
    /// concurrently
    pub async fn wait<F: FileSystem + ?Sized>(&self, fs: &F) -> Result<()> {
        self.ready
            .get_or_try_init(|| ensure_root(fs, &self.path))
            .await
            .map(|_| ())
    }
}
