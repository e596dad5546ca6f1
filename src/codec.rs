//! Key Codec
//!
//! Maps opaque key strings to file names inside the storage root and back.
//!
//! The default [`DelimiterCodec`] swaps the reserved delimiter `:` for `-`.
//! The target separator is not escaped, so a key that already contains `-`
//! decodes differently: `"a-b"` is written as `a-b` and listed back as
//! `"a:b"`. Callers whose keys may contain the separator supply their own
//! codec through [`crate::ConfigUpdate`].

use std::fmt;
use std::sync::Arc;

/// Bidirectional key ↔ file name mapping
///
/// Implementations should satisfy `from_file_name(&to_file_name(k)) == k`
/// for every key they are expected to store. This is not checked.
pub trait KeyCodec: Send + Sync {
    /// Encode a key into a file name
    fn to_file_name(&self, key: &str) -> String;

    /// Decode a file name back into a key
    fn from_file_name(&self, file_name: &str) -> String;
}

/// Substitutes a reserved delimiter character with a filesystem-safe one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterCodec {
    delimiter: char,
    separator: char,
}

impl DelimiterCodec {
    pub const DEFAULT_DELIMITER: char = ':';
    pub const DEFAULT_SEPARATOR: char = '-';

    /// Create a codec that writes `delimiter` as `separator`
    pub fn new(delimiter: char, separator: char) -> Self {
        Self {
            delimiter,
            separator,
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

impl Default for DelimiterCodec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELIMITER, Self::DEFAULT_SEPARATOR)
    }
}

impl KeyCodec for DelimiterCodec {
    fn to_file_name(&self, key: &str) -> String {
        key.replace(self.delimiter, &self.separator.to_string())
    }

    fn from_file_name(&self, file_name: &str) -> String {
        file_name.replace(self.separator, &self.delimiter.to_string())
    }
}

type MapFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Codec built from a pair of caller-supplied functions
#[derive(Clone)]
pub struct FnCodec {
    to: MapFn,
    from: MapFn,
}

impl FnCodec {
    pub fn new<T, F>(to_file_name: T, from_file_name: F) -> Self
    where
        T: Fn(&str) -> String + Send + Sync + 'static,
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            to: Arc::new(to_file_name),
            from: Arc::new(from_file_name),
        }
    }

    /// Replace only the encoding half, keeping the decoder of `base`
    pub(crate) fn with_to(base: Arc<dyn KeyCodec>, to: MapFn) -> Self {
        Self {
            to,
            from: Arc::new(move |name: &str| base.from_file_name(name)),
        }
    }

    /// Replace only the decoding half, keeping the encoder of `base`
    pub(crate) fn with_from(base: Arc<dyn KeyCodec>, from: MapFn) -> Self {
        Self {
            to: Arc::new(move |key: &str| base.to_file_name(key)),
            from,
        }
    }
}

impl KeyCodec for FnCodec {
    fn to_file_name(&self, key: &str) -> String {
        (self.to)(key)
    }

    fn from_file_name(&self, file_name: &str) -> String {
        (self.from)(file_name)
    }
}

impl fmt::Debug for FnCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}
