//! Key/value persistence for consent state.
//!
//! This module defines the [`StorageArea`] trait the consent store writes
//! through, and the backends shipped with the crate. The store never talks to
//! a concrete backend; it receives a [`StorageHandles`] pair at construction
//! time and keeps both values (status flag and tree snapshot) in them.
//!
//! # Available backends
//!
//! - [`InMemoryArea`] — Volatile map, for tests and private sessions.
//! - [`CookieArea`] — Cookie records with `Max-Age`/`Path`/`SameSite`
//!   attributes; renders the `document.cookie` string a bootstrap script reads.
//! - [`JsonFileArea`] — Single JSON file on disk.
//! - [`SqliteArea`] — SQLite-backed, behind the `sqlite_store` feature.
//! - [`DisabledArea`] — Rejects every write, modelling blocked storage.
//!
//! # Example: cookie flag, in-memory snapshot
//!
//! ```rust
//! use std::sync::Arc;
//! use cookie_consent::config::ConsentConfig;
//! use cookie_consent::storage::{CookieArea, CookieAttributes, InMemoryArea, StorageArea, StorageHandles};
//!
//! let cfg = ConsentConfig::default();
//! let handles = StorageHandles {
//!     flag: Arc::new(CookieArea::new(CookieAttributes::from_config(&cfg))),
//!     snapshot: Arc::new(InMemoryArea::new()),
//! };
//! assert_eq!(handles.flag.len(), 0);
//! ```

use std::sync::Arc;

/// Storage area module, defining the key/value storage interface.
pub mod area;
/// Cookie-record backed storage area.
pub mod cookie_area;
/// Storage area that refuses writes.
pub mod disabled;
/// In-memory storage area.
pub mod in_memory;
/// JSON file backed storage area.
pub mod json_file;
/// SQLite-backed storage area.
#[cfg(feature = "sqlite_store")]
pub mod sqlite_store;

/// Handles to the areas holding the status flag and the tree snapshot.
///
/// Both handles may point at the same area.
#[derive(Clone)]
pub struct StorageHandles {
    /// Area holding the status flag. Usually a [`CookieArea`] so that a
    /// pre-hydration script can read it.
    pub flag: Arc<dyn StorageArea>,
    /// Area holding the serialized consent tree.
    pub snapshot: Arc<dyn StorageArea>,
}

impl StorageHandles {
    /// Uses one area for both values.
    pub fn shared(area: Arc<dyn StorageArea>) -> Self {
        Self {
            flag: area.clone(),
            snapshot: area,
        }
    }

    /// Fresh in-memory areas.
    pub fn in_memory() -> Self {
        Self {
            flag: Arc::new(InMemoryArea::new()),
            snapshot: Arc::new(InMemoryArea::new()),
        }
    }

    /// Whether flag and snapshot live in the same area.
    pub fn is_shared(&self) -> bool {
        Arc::ptr_eq(&self.flag, &self.snapshot)
    }
}

pub use area::StorageArea;
pub use cookie_area::{CookieArea, CookieAttributes, CookieRecord, SameSite};
pub use disabled::DisabledArea;
pub use in_memory::InMemoryArea;
pub use json_file::JsonFileArea;
#[cfg(feature = "sqlite_store")]
pub use sqlite_store::SqliteArea;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_handles_point_at_one_area() {
        let handles = StorageHandles::shared(Arc::new(InMemoryArea::new()));
        assert!(handles.is_shared());
        handles.flag.set_item("k", "v").unwrap();
        assert_eq!(handles.snapshot.get_item("k").as_deref(), Some("v"));
    }

    #[test]
    fn in_memory_handles_are_isolated() {
        let handles = StorageHandles::in_memory();
        assert!(!handles.is_shared());
        handles.flag.set_item("k", "v").unwrap();
        assert!(handles.snapshot.get_item("k").is_none());
    }
}
