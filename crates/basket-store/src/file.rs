//! # File Store
//!
//! A [`CartStore`] that keeps one pretty-printed JSON file per storage key.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  <store dir>/                                                           │
//! │  ├── basket.json          storage key "basket"                          │
//! │  ├── session%2F42.json    storage key "session/42" (percent-encoded)    │
//! │  └── ...                                                                │
//! │                                                                         │
//! │  store():  write <key>.json.tmp, then rename over <key>.json            │
//! │  load():   missing file → None                                          │
//! │  delete(): missing file → Ok                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes replace the whole file; two processes sharing a key race and the
//! last rename wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use basket_core::{CartRecord, CartStore, StoreResult};

/// Stores cart records as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the record for `key`.
    ///
    /// The key is percent-encoded: every byte outside `[A-Za-z0-9_-]`
    /// (dots included) becomes `%XX`. The encoding is reversible, so distinct
    /// keys never share a file, and no key can name a hidden file or leave
    /// the directory. The empty key maps to `%.json`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => name.push(byte as char),
                _ => name.push_str(&format!("%{byte:02X}")),
            }
        }

        if name.is_empty() {
            name.push('%');
        }

        self.dir.join(format!("{name}.json"))
    }
}

impl CartStore for FileStore {
    fn load(&self, key: &str) -> StoreResult<Option<CartRecord>> {
        let path = self.path_for(key);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %key, path = ?path, "No cart file");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        debug!(key = %key, path = ?path, "Read cart file");
        Ok(Some(CartRecord::from_json(&contents)?))
    }

    fn store(&self, key: &str, record: &CartRecord) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        let contents = serde_json::to_string_pretty(record)?;
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;

        debug!(key = %key, path = ?path, items = record.items.len(), "Wrote cart file");
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key = %key, path = ?path, "Deleted cart file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
