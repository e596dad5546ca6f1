//! Filesystem Capability
//!
//! The primitives the store consumes. [`TokioFileSystem`] backs them with
//! `tokio::fs`; tests swap in wrappers that inject failures.

use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::config::TextEncoding;

/// Asynchronous filesystem primitives used by the store
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Check whether a path exists
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Create a single directory; fails if the parent is missing
    async fn mkdir(&self, path: &Path) -> io::Result<()>;

    /// Write `content` to a file, replacing any existing content
    async fn write_file(&self, path: &Path, content: &str, encoding: TextEncoding)
        -> io::Result<()>;

    /// Read a whole file as text
    async fn read_file(&self, path: &Path, encoding: TextEncoding) -> io::Result<String>;

    /// Remove a file
    async fn unlink(&self, path: &Path) -> io::Result<()>;

    /// List entry names (not full paths) of a directory
    async fn list_directory(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// `tokio::fs` backed filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir(path).await
    }

    async fn write_file(
        &self,
        path: &Path,
        content: &str,
        encoding: TextEncoding,
    ) -> io::Result<()> {
        let bytes = encoding.encode(content)?;
        tokio::fs::write(path, bytes).await
    }

    async fn read_file(&self, path: &Path, encoding: TextEncoding) -> io::Result<String> {
        let bytes = tokio::fs::read(path).await?;
        encoding.decode(bytes)
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!("Skipping non UTF-8 entry {:?} in {:?}", raw, path);
                }
            }
        }

        Ok(names)
    }
}
