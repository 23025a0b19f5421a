//! JSON-backed storage area.
//!
//! `JsonFileArea` keeps all items in a single JSON object on disk and an
//! in-memory copy for reads. Every mutation rewrites the whole file.
//!
//! ### I/O characteristics & caveats
//! - Writes are not atomic. For larger or shared datasets use
//!   [`SqliteArea`](crate::storage::SqliteArea).
//! - A file that cannot be parsed is treated as empty (and logged); it is
//!   overwritten on the next write.
//!
//! ### Example
//! ```ignore
//! let area = JsonFileArea::open("consent.json")?;
//! area.set_item("cookie-accepted", "accepted")?;
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{anyhow, Context, Result};

use crate::storage::area::StorageArea;

/// A JSON file based storage area that persists items across sessions.
pub struct JsonFileArea {
    /// Path to the JSON file where items are stored.
    path: PathBuf,

    /// In-memory copy of the file contents.
    items: RwLock<BTreeMap<String, String>>,
}

impl JsonFileArea {
    /// Opens (or creates) a JSON storage file at `path`.
    ///
    /// If the file does not exist, an empty object is written to disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = if path.exists() {
            Self::load_file(&path)?
        } else {
            BTreeMap::new()
        };

        let area = Self {
            path,
            items: RwLock::new(items),
        };
        if !area.path.exists() {
            area.save_file(&BTreeMap::new())?;
        }
        Ok(area)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the storage file.
    ///
    /// Returns an empty map if deserialization fails.
    fn load_file(path: &Path) -> Result<BTreeMap<String, String>> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot read storage file {}", path.display()))?;

        Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("Storage file {} is not valid JSON, starting empty: {}", path.display(), e);
            BTreeMap::new()
        }))
    }

    /// Serializes and writes the full storage file (pretty-printed).
    fn save_file(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let contents = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("cannot write storage file {}", self.path.display()))?;
        Ok(())
    }

    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut items = self.items.write().map_err(|_| anyhow!("json area lock poisoned"))?;
        // Memory only changes once the file write succeeds.
        let mut next = items.clone();
        f(&mut next);
        self.save_file(&next)?;
        *items = next;
        Ok(())
    }
}

impl StorageArea for JsonFileArea {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.mutate(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.mutate(|items| items.clear())
    }

    fn len(&self) -> usize {
        self.items.read().map(|i| i.len()).unwrap_or(0)
    }

    fn keys(&self) -> Vec<String> {
        match self.items.read() {
            Ok(items) => items.keys().cloned().collect(),
            Err(_) => vec![],
        }
    }
}
