//! Tests for key enumeration

use std::collections::HashSet;
use std::fs;

use persistfs::{Config, ConfigUpdate, FilesystemStorage};
use tempfile::TempDir;

fn setup_temp_store() -> (TempDir, FilesystemStorage) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .storage_path(temp_dir.path().join("persistStore"))
        .build();
    (temp_dir, FilesystemStorage::new(config))
}

fn as_set(keys: Vec<String>) -> HashSet<String> {
    keys.into_iter().collect()
}

#[tokio::test]
async fn test_keys_on_fresh_root_is_empty_and_creates_root() {
    let (temp, store) = setup_temp_store();
    let root = temp.path().join("persistStore");
    assert!(!root.exists());

    let keys = store.get_all_keys().await.unwrap();

    assert!(keys.is_empty());
    assert!(root.is_dir());
}

#[tokio::test]
async fn test_keys_returns_written_keys_decoded() {
    let (_temp, store) = setup_temp_store();

    store.set_item("persist:root", "1").await.unwrap();
    store.set_item("persist:auth", "2").await.unwrap();

    let keys = as_set(store.get_all_keys().await.unwrap());
    let expected: HashSet<String> = ["persist:root", "persist:auth"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(keys, expected);
}

#[tokio::test]
async fn test_keys_after_remove() {
    let (_temp, store) = setup_temp_store();

    store.set_item("a", "1").await.unwrap();
    store.set_item("b", "2").await.unwrap();
    store.remove_item("a").await.unwrap();

    assert_eq!(store.get_all_keys().await.unwrap(), vec!["b".to_string()]);
}

#[tokio::test]
async fn test_keys_with_separator_decode_as_delimiter() {
    let (_temp, store) = setup_temp_store();

    // Known boundary of the default codec: '-' is not escaped
    store.set_item("a-b", "1").await.unwrap();

    assert_eq!(store.get_all_keys().await.unwrap(), vec!["a:b".to_string()]);
}

#[tokio::test]
async fn test_keys_use_custom_decoder() {
    let (temp, store) = setup_temp_store();
    let root = temp.path().join("persistStore");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("state.json"), "{}").unwrap();

    store
        .configure(
            ConfigUpdate::new()
                .to_file_name(|key| format!("{key}.json"))
                .from_file_name(|name| name.trim_end_matches(".json").to_string()),
        )
        .unwrap();

    assert_eq!(store.get_all_keys().await.unwrap(), vec!["state".to_string()]);
    assert_eq!(store.get_item("state").await.unwrap(), Some("{}".to_string()));
}

#[tokio::test]
async fn test_keys_follow_storage_path() {
    let (temp, store) = setup_temp_store();
    store.set_item("old", "1").await.unwrap();

    store
        .configure(ConfigUpdate::new().storage_path(temp.path().join("second")))
        .unwrap();

    assert!(store.get_all_keys().await.unwrap().is_empty());
    store.set_item("new", "2").await.unwrap();
    assert_eq!(store.get_all_keys().await.unwrap(), vec!["new".to_string()]);
}

#[tokio::test]
async fn test_keys_fail_when_root_cannot_be_created() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let config = Config::builder().storage_path(blocker.join("store")).build();
    let store = FilesystemStorage::new(config);

    let err = store.get_all_keys().await.unwrap_err();

    assert!(matches!(err, persistfs::StoreError::Initialization { .. }));
}
