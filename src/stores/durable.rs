//! Durable key-value storage the account store synchronizes to.
//!
//! The contract mirrors a browser-style local storage: synchronous,
//! string-keyed, string-valued, and allowed to refuse writes once its
//! capacity is exhausted.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

pub trait DurableStore {
    /// Returns the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: DurableStore + ?Sized> DurableStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-memory storage with an optional capacity.
///
/// The quota covers the bytes of every key and value held. A write that
/// would exceed it fails with [`Error::QuotaExceeded`] and leaves the
/// previous value in place.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Seeds a value without counting it as a write.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl DurableStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let requested = self.used_bytes() - replaced + key.len() + value.len();
            if requested > quota {
                return Err(Error::QuotaExceeded { requested, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Filesystem storage: one `<key>.json` file per key under a directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so a reader never observes a half-written value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Unavailable(format!("invalid storage key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl DurableStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "file_storage: no value stored");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| {
            warn!(dir = %self.dir.display(), error = %e, "file_storage: create_dir_all failed");
            e
        })?;

        let temp_path = path.with_extension("json.tmp");
        let written = fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(value.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written {
            warn!(temp_path = %temp_path.display(), error = %e, "file_storage: write failed");
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        fs::rename(&temp_path, &path).map_err(|e| {
            warn!(from = %temp_path.display(), to = %path.display(), error = %e, "file_storage: rename failed");
            e
        })?;
        Ok(())
    }
}
