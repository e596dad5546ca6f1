//! Tests for clear
//!
//! These tests verify:
//! - Empty store reports false without error
//! - Every key is removed and true is reported
//! - A failing removal does not stop the others, and surfaces as an error

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use persistfs::{Config, FileSystem, FilesystemStorage, StoreError, TextEncoding, TokioFileSystem};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Local filesystem that refuses to unlink selected file names
#[derive(Default)]
struct DenyUnlink {
    inner: TokioFileSystem,
    denied: HashSet<String>,
    unlink_calls: AtomicUsize,
}

impl DenyUnlink {
    fn denying(names: &[&str]) -> Self {
        Self {
            denied: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl FileSystem for DenyUnlink {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        self.inner.exists(path).await
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        self.inner.mkdir(path).await
    }

    async fn write_file(
        &self,
        path: &Path,
        content: &str,
        encoding: TextEncoding,
    ) -> io::Result<()> {
        self.inner.write_file(path, content, encoding).await
    }

    async fn read_file(&self, path: &Path, encoding: TextEncoding) -> io::Result<String> {
        self.inner.read_file(path, encoding).await
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        self.unlink_calls.fetch_add(1, Ordering::SeqCst);
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.denied.contains(name) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "simulated"));
        }
        self.inner.unlink(path).await
    }

    async fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
        self.inner.list_directory(path).await
    }
}

fn setup_temp_store() -> (TempDir, FilesystemStorage) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .storage_path(temp_dir.path().join("persistStore"))
        .build();
    (temp_dir, FilesystemStorage::new(config))
}

fn setup_denying_store(names: &[&str]) -> (TempDir, FilesystemStorage<DenyUnlink>) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .storage_path(temp_dir.path().join("persistStore"))
        .build();
    (temp_dir, FilesystemStorage::with_fs(config, DenyUnlink::denying(names)))
}

// =============================================================================
// Clear Tests
// =============================================================================

#[tokio::test]
async fn test_clear_empty_store_returns_false() {
    let (_temp, store) = setup_temp_store();

    assert!(!store.clear().await.unwrap());
}

#[tokio::test]
async fn test_clear_removes_all_keys() {
    let (temp, store) = setup_temp_store();

    for i in 0..5 {
        store.set_item(&format!("persist:{i}"), "v").await.unwrap();
    }

    assert!(store.clear().await.unwrap());
    assert!(store.get_all_keys().await.unwrap().is_empty());
    let remaining = std::fs::read_dir(temp.path().join("persistStore")).unwrap().count();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_clear_twice() {
    let (_temp, store) = setup_temp_store();

    store.set_item("key", "value").await.unwrap();

    assert!(store.clear().await.unwrap());
    assert!(!store.clear().await.unwrap());
}

#[tokio::test]
async fn test_clear_failure_still_removes_other_keys() {
    let (_temp, store) = setup_denying_store(&["locked"]);

    store.set_item("a", "1").await.unwrap();
    store.set_item("locked", "2").await.unwrap();
    store.set_item("b", "3").await.unwrap();

    let err = store.clear().await.unwrap_err();

    match &err {
        StoreError::Clear {
            failed,
            total,
            source,
        } => {
            assert_eq!(*failed, 1);
            assert_eq!(*total, 3);
            assert!(matches!(**source, StoreError::Delete { ref key, .. } if key == "locked"));
        }
        other => panic!("expected Clear error, got {other:?}"),
    }
    assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));

    // Every removal was attempted
    assert_eq!(store_fs_unlinks(&store), 3);
    assert_eq!(store.get_all_keys().await.unwrap(), vec!["locked".to_string()]);
}

#[tokio::test]
async fn test_clear_counts_every_failure() {
    let (_temp, store) = setup_denying_store(&["x", "y"]);

    store.set_item("x", "1").await.unwrap();
    store.set_item("y", "2").await.unwrap();
    store.set_item("z", "3").await.unwrap();

    let err = store.clear().await.unwrap_err();

    assert!(matches!(err, StoreError::Clear { failed: 2, total: 3, .. }));
    let keys: HashSet<String> = store.get_all_keys().await.unwrap().into_iter().collect();
    assert_eq!(keys, HashSet::from(["x".to_string(), "y".to_string()]));
}

#[tokio::test]
async fn test_clear_retry_after_failure_is_idempotent() {
    let (temp, store) = setup_denying_store(&["stuck"]);

    store.set_item("stuck", "1").await.unwrap();
    store.set_item("free", "2").await.unwrap();
    assert!(store.clear().await.is_err());

    // Once the obstacle is gone a plain store over the same root finishes
    let retry = FilesystemStorage::new(
        Config::builder()
            .storage_path(temp.path().join("persistStore"))
            .build(),
    );
    assert!(retry.clear().await.unwrap());
    assert!(retry.get_all_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_shared_across_tasks() {
    let (_temp, store) = setup_temp_store();
    let store = Arc::new(store);

    store.set_item("a", "1").await.unwrap();
    store.set_item("b", "2").await.unwrap();

    let first = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.clear().await }
    });
    let second = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.clear().await }
    });

    // Absent files are not errors, so neither racing clear fails
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert!(store.get_all_keys().await.unwrap().is_empty());
}

fn store_fs_unlinks(store: &FilesystemStorage<DenyUnlink>) -> usize {
    store.fs().unlink_calls.load(Ordering::SeqCst)
}
