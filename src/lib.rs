//! # persistfs
//!
//! An asynchronous key-value storage backend for state persistence
//! libraries, keeping one file per key:
//! - Reversible key ↔ file name mapping (pluggable codec)
//! - Lazily created storage root, initialized at most once per path
//! - Missing keys read as `None`, removing them is a no-op
//! - `clear` that removes everything it can and reports the first failure
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FilesystemStorage                         │
//! │   set_item · get_item · remove_item · get_all_keys · clear   │
//! └──────────┬──────────────────┬───────────────────────────────┘
//!            │                  │
//!            ▼                  ▼
//!   ┌─────────────────┐  ┌─────────────┐
//!   │ Config snapshot │  │  RootGate   │
//!   │ (path, encoding,│  │ (mkdir once │
//!   │      codec)     │  │  per path)  │
//!   └─────────────────┘  └──────┬──────┘
//!                               │
//!                               ▼
//!                        ┌─────────────┐
//!                        │ FileSystem  │
//!                        │ (tokio::fs) │
//!                        └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use persistfs::{Config, FilesystemStorage};
//!
//! # async fn run() -> persistfs::Result<()> {
//! let store = FilesystemStorage::new(Config::builder().storage_path("/tmp/state").build());
//! store.set_item("persist:root", "{}").await?;
//! assert_eq!(store.get_item("persist:root").await?, Some("{}".to_string()));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod fs;
pub mod root;
pub mod notify;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, ConfigUpdate, TextEncoding};
pub use codec::{DelimiterCodec, FnCodec, KeyCodec};
pub use fs::{FileSystem, TokioFileSystem};
pub use notify::Notify;
pub use store::FilesystemStorage;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of persistfs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
