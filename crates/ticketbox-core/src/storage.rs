//! Synchronous string key-value storage for JSON blobs.
//!
//! Two fixed keys are used: [`TICKETS_KEY`] holds the ticket collection and
//! [`TOGGLE_KEY`] holds the form-visibility toggle.
//!
//! # Layout of [`FileStore`]
//!
//! ```text
//! <data dir>/
//!   t_tickets.json     # key "t:tickets"
//!   t_toggle.json      # key "t:toggle"
//! ```
//!
//! Writes go to a `.tmp` sibling and are renamed into place, so readers never
//! see a partial blob. There is no locking: two processes writing the same
//! key race and the last rename wins.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;

/// Key of the ticket collection blob.
pub const TICKETS_KEY: &str = "t:tickets";
/// Key of the form-visibility toggle blob.
pub const TOGGLE_KEY: &str = "t:toggle";

/// Failures of the underlying store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::StorageReadFailed,
            Self::Write { .. } => ErrorCode::StorageWriteFailed,
        }
    }
}

/// A synchronous string-keyed store of string values.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the backing medium fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the backing medium fails.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Outcome of decoding a stored JSON blob.
#[derive(Debug, PartialEq, Eq)]
pub enum Blob<T> {
    Missing,
    Malformed(String),
    Value(T),
}

impl<T> Blob<T> {
    /// The decoded value, treating missing and malformed blobs alike.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::Malformed(_) => None,
        }
    }
}

/// Read and decode the JSON blob under `key`.
///
/// # Errors
///
/// Only store failures are errors; undecodable data is reported as
/// [`Blob::Malformed`].
pub fn read_blob<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Blob<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Blob::Missing);
    };
    match serde_json::from_str::<Option<T>>(&raw) {
        Ok(Some(value)) => Ok(Blob::Value(value)),
        // A stored `null` reads like an absent key.
        Ok(None) => Ok(Blob::Missing),
        Err(err) => Ok(Blob::Malformed(err.to_string())),
    }
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the store write fails.
pub fn write_blob<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), crate::error::TicketError> {
    let encoded = serde_json::to_string(value)?;
    store.set(key, &encoded)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-process store, used by tests and headless embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw access for tests that simulate external writers.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// A store that keeps one JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file that backs `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let write_err = |source| StorageError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;
        tracing::trace!(key, path = %path.display(), bytes = value.len(), "stored blob");
        Ok(())
    }
}
