//! Store Module
//!
//! The key-value API: one file per key inside the storage root.
//!
//! ## Responsibilities
//! - Map keys to file paths through the configured codec
//! - Gate item operations behind the memoized storage root
//! - Enumerate and clear the whole store
//!
//! ## Concurrency
//! Nothing here serializes access to a key. Two concurrent `set_item` calls
//! for the same key race at the filesystem and the last committed write
//! wins; a concurrent read may see either value.
//!
//! Each call captures the current configuration snapshot when it starts.
//! A [`FilesystemStorage::configure`] racing with in-flight calls does not
//! affect them: they finish against the snapshot they captured.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;

use crate::config::{Config, ConfigUpdate};
use crate::error::{Result, StoreError};
use crate::fs::{FileSystem, TokioFileSystem};
use crate::notify::{deliver, Notify};
use crate::root::{ensure_root, RootGate};

/// Configuration plus the root gate for its storage path, swapped as a unit
struct Snapshot {
    config: Config,
    root: Arc<RootGate>,
}

impl Snapshot {
    fn new(config: Config) -> Self {
        let root = Arc::new(RootGate::new(config.storage_path.clone()));
        Self { config, root }
    }

    /// Path of the file holding `key`
    ///
    /// The encoded name must be a single plain path component, so every key
    /// maps to a file directly inside the storage root.
    fn path_for_key(&self, key: &str) -> Result<PathBuf> {
        let file_name = self.config.codec.to_file_name(key);
        tracing::trace!(key, file_name = %file_name, "Encoded key");

        let mut components = Path::new(&file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == file_name.as_str() => {
                Ok(self.config.storage_path.join(&file_name))
            }
            _ => Err(StoreError::InvalidKey {
                key: key.to_string(),
                file_name,
            }),
        }
    }
}

/// Filesystem-backed key-value storage
///
/// All public methods take `&self`; the instance can be shared behind an
/// `Arc` across tasks.
pub struct FilesystemStorage<F: FileSystem = TokioFileSystem> {
    /// Filesystem primitives
    fs: F,

    /// Current configuration snapshot (only swapped, never mutated in place)
    state: RwLock<Arc<Snapshot>>,
}

impl FilesystemStorage<TokioFileSystem> {
    /// Create a store on the local filesystem
    pub fn new(config: Config) -> Self {
        Self::with_fs(config, TokioFileSystem)
    }
}

impl Default for FilesystemStorage<TokioFileSystem> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<F: FileSystem> FilesystemStorage<F> {
    /// Create a store over a custom filesystem
    pub fn with_fs(config: Config, fs: F) -> Self {
        Self {
            fs,
            state: RwLock::new(Arc::new(Snapshot::new(config))),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Merge `update` into the current configuration and return the result
    ///
    /// A changed storage path gets a fresh root gate, so the next item
    /// operation initializes the new directory. Files under the old path are
    /// left alone.
    pub fn configure(&self, update: ConfigUpdate) -> Result<Config> {
        let mut state = self.state.write();
        let config = state.config.merge(update)?;

        let root = if config.storage_path.as_path() == state.root.path() {
            Arc::clone(&state.root)
        } else {
            tracing::debug!(
                "Storage path changed: {:?} -> {:?}",
                state.root.path(),
                config.storage_path
            );
            Arc::new(RootGate::new(config.storage_path.clone()))
        };

        *state = Arc::new(Snapshot {
            config: config.clone(),
            root,
        });

        Ok(config)
    }

    /// Copy of the current configuration
    pub fn config(&self) -> Config {
        self.snapshot().config.clone()
    }

    /// The filesystem this store runs on
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Whether the current storage root has been initialized by an item
    /// operation
    pub fn is_root_ready(&self) -> bool {
        self.snapshot().root.is_ready()
    }

    // =========================================================================
    // Item Operations
    // =========================================================================

    /// Write `value` under `key`, replacing any previous value
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let snap = self.snapshot();
        let path = snap.path_for_key(key)?;
        snap.root.wait(&self.fs).await?;

        tracing::debug!("set_item {:?} -> {:?}", key, path);

        let written = self.fs.write_file(&path, value, snap.config.encoding).await;
        match written {
            Ok(()) => Ok(()),
            Err(source) => Err(StoreError::Write {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    /// Read the value stored under `key`
    ///
    /// Returns `Ok(None)` when nothing is stored under `key`. A file that
    /// exists but cannot be read is an error.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let snap = self.snapshot();
        let path = snap.path_for_key(key)?;
        snap.root.wait(&self.fs).await?;

        tracing::debug!("get_item {:?} <- {:?}", key, path);

        let read = self.fs.read_file(&path, snap.config.encoding).await;
        let source = match read {
            Ok(value) => return Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => e,
        };

        // Read failed for another reason; a file that vanished meanwhile is
        // still just absent
        let exists = self.fs.exists(&path).await;
        match exists {
            Ok(false) => Ok(None),
            _ => Err(StoreError::Read {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    /// Delete the value stored under `key`; absent keys are not an error
    pub async fn remove_item(&self, key: &str) -> Result<()> {
        let snap = self.snapshot();
        self.remove_in(&snap, key).await
    }

    async fn remove_in(&self, snap: &Snapshot, key: &str) -> Result<()> {
        let path = snap.path_for_key(key)?;
        snap.root.wait(&self.fs).await?;

        tracing::debug!("remove_item {:?} at {:?}", key, path);

        let delete_err = |path: PathBuf, source: io::Error| StoreError::Delete {
            key: key.to_string(),
            path,
            source,
        };

        let exists = self.fs.exists(&path).await;
        match exists {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(source) => return Err(delete_err(path, source)),
        }

        let unlinked = self.fs.unlink(&path).await;
        match unlinked {
            Ok(()) => Ok(()),
            // Removed by someone else after the probe
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(delete_err(path, source)),
        }
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// List every stored key, in directory listing order
    ///
    /// Creates the storage root if it does not exist yet.
    pub async fn get_all_keys(&self) -> Result<Vec<String>> {
        let snap = self.snapshot();
        self.keys_in(&snap).await
    }

    async fn keys_in(&self, snap: &Snapshot) -> Result<Vec<String>> {
        let root = &snap.config.storage_path;
        ensure_root(&self.fs, root).await?;

        let names = self
            .fs
            .list_directory(root)
            .await
            .map_err(|source| StoreError::List {
                path: root.clone(),
                source,
            })?;

        let keys: Vec<String> = names
            .iter()
            .map(|name| snap.config.codec.from_file_name(name))
            .collect();

        tracing::debug!("get_all_keys found {} keys in {:?}", keys.len(), root);
        Ok(keys)
    }

    // =========================================================================
    // Clear
    // =========================================================================

    /// Remove every stored key
    ///
    /// Returns `Ok(false)` when there was nothing to remove and `Ok(true)`
    /// when every key was removed. If any removal fails the others still
    /// run, and the first failure is returned wrapped in
    /// [`StoreError::Clear`].
    pub async fn clear(&self) -> Result<bool> {
        let snap = self.snapshot();
        let keys = self.keys_in(&snap).await?;

        if keys.is_empty() {
            tracing::debug!("clear: nothing to remove");
            return Ok(false);
        }

        let total = keys.len();
        let results = join_all(keys.iter().map(|key| self.remove_in(&snap, key))).await;

        let mut failed = 0;
        let mut first_error = None;
        for (key, result) in keys.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!("clear: failed to remove {:?}: {}", key, e);
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            None => {
                tracing::debug!("clear: removed {} keys", total);
                Ok(true)
            }
            Some(source) => Err(StoreError::Clear {
                failed,
                total,
                source: Box::new(source),
            }),
        }
    }

    // =========================================================================
    // Notification Variants
    // =========================================================================

    /// [`set_item`](Self::set_item), also reporting to `on_done`
    pub async fn set_item_with(&self, key: &str, value: &str, on_done: Notify<()>) -> Result<()> {
        deliver(self.set_item(key, value).await, on_done)
    }

    /// [`get_item`](Self::get_item), also reporting to `on_done`
    pub async fn get_item_with(
        &self,
        key: &str,
        on_done: Notify<Option<String>>,
    ) -> Result<Option<String>> {
        deliver(self.get_item(key).await, on_done)
    }

    /// [`remove_item`](Self::remove_item), also reporting to `on_done`
    pub async fn remove_item_with(&self, key: &str, on_done: Notify<()>) -> Result<()> {
        deliver(self.remove_item(key).await, on_done)
    }

    /// [`get_all_keys`](Self::get_all_keys), also reporting to `on_done`
    pub async fn get_all_keys_with(&self, on_done: Notify<Vec<String>>) -> Result<Vec<String>> {
        deliver(self.get_all_keys().await, on_done)
    }

    /// [`clear`](Self::clear), also reporting to `on_done`
    pub async fn clear_with(&self, on_done: Notify<bool>) -> Result<bool> {
        deliver(self.clear().await, on_done)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read())
    }
}
