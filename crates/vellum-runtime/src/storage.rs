//! Snapshot persistence behind a small key-value trait.
//!
//! The engine persists one JSON snapshot per key after every mutation and
//! reads it back on load. Both operations are best-effort: a backend that
//! cannot read returns `None`, a backend that cannot write logs and drops
//! the snapshot, and the engine carries on either way.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use ahash::AHashMap;
use tracing::{debug, warn};

/// Where snapshots live between sessions.
pub trait Storage {
    /// Read the snapshot stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous snapshot.
    fn set(&mut self, key: &str, value: &str);
}

/// In-process storage; snapshots live only as long as the backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: AHashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// One file per key under a directory, named `<key>.json`.
///
/// Key characters outside `[A-Za-z0-9._-]` are replaced with `_` so a key
/// can never escape the directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored snapshot");
                None
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "snapshot read failed");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        let path = self.path_for(key);
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), %err, "storage directory unavailable");
            return;
        }
        if let Err(err) = fs::write(&path, value) {
            warn!(path = %path.display(), %err, "snapshot write failed");
        }
    }
}
