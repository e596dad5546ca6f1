//! Configuration for persistfs
//!
//! Centralized configuration with sensible defaults, plus [`ConfigUpdate`]
//! for partial reconfiguration where omitted fields keep their value.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::codec::{DelimiterCodec, FnCodec, KeyCodec};
use crate::error::{Result, StoreError};

/// Name of the storage root inside the host documents directory
pub const DEFAULT_DIR_NAME: &str = "persistStore";

/// Resolve the default storage root: `<documents>/persistStore`
///
/// Falls back to `<home>/Documents`, then to the current directory, when the
/// host does not report a documents directory.
pub fn default_storage_path() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Main configuration for a storage instance
#[derive(Clone)]
pub struct Config {
    /// Directory holding one file per key
    pub storage_path: PathBuf,

    /// Text encoding of file contents
    pub encoding: TextEncoding,

    /// Key ↔ file name mapping
    pub codec: Arc<dyn KeyCodec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            encoding: TextEncoding::default(),
            codec: Arc::new(DelimiterCodec::default()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("storage_path", &self.storage_path)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Merge a partial update over this config, field by field
    ///
    /// Supplying `to_file_name` or `from_file_name` alone replaces only that
    /// half of the current codec.
    pub fn merge(&self, update: ConfigUpdate) -> Result<Config> {
        let mut merged = self.clone();

        if let Some(path) = update.storage_path {
            if path.as_os_str().is_empty() {
                return Err(StoreError::Config("storage path must not be empty".into()));
            }
            merged.storage_path = path;
        }
        if let Some(encoding) = update.encoding {
            merged.encoding = encoding;
        }
        if let Some(codec) = update.codec {
            merged.codec = codec;
        }
        if let Some(to) = update.to_file_name {
            merged.codec = Arc::new(FnCodec::with_to(merged.codec, to));
        }
        if let Some(from) = update.from_file_name {
            merged.codec = Arc::new(FnCodec::with_from(merged.codec, from));
        }

        Ok(merged)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage root directory
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_path = path.into();
        self
    }

    /// Set the text encoding
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    /// Set the key codec
    pub fn codec(mut self, codec: impl KeyCodec + 'static) -> Self {
        self.config.codec = Arc::new(codec);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

type MapFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Partial configuration; `None` fields keep their current value
#[derive(Default, Clone)]
pub struct ConfigUpdate {
    storage_path: Option<PathBuf>,
    encoding: Option<TextEncoding>,
    codec: Option<Arc<dyn KeyCodec>>,
    to_file_name: Option<MapFn>,
    from_file_name: Option<MapFn>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Replace both halves of the codec
    pub fn codec(mut self, codec: impl KeyCodec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Replace only the key → file name half
    pub fn to_file_name<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.to_file_name = Some(Arc::new(f));
        self
    }

    /// Replace only the file name → key half
    pub fn from_file_name<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.from_file_name = Some(Arc::new(f));
        self
    }
}

// =============================================================================
// Text Encoding
// =============================================================================

/// Encoding used to store values on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,

    /// 7-bit ASCII; non-ASCII values are rejected
    Ascii,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Ascii => "ascii",
        }
    }

    /// Encode a value into file bytes
    pub fn encode(&self, value: &str) -> std::io::Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(value.as_bytes().to_vec()),
            TextEncoding::Ascii if value.is_ascii() => Ok(value.as_bytes().to_vec()),
            TextEncoding::Ascii => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "value contains non-ASCII characters",
            )),
        }
    }

    /// Decode file bytes into a value
    pub fn decode(&self, bytes: Vec<u8>) -> std::io::Result<String> {
        if *self == TextEncoding::Ascii && !bytes.is_ascii() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "file contains non-ASCII bytes",
            ));
        }
        String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextEncoding {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "ascii" => Ok(TextEncoding::Ascii),
            other => Err(StoreError::Config(format!("unsupported encoding: {other}"))),
        }
    }
}
