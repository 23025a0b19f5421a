//! Consent state: [`ConsentStore`], the tree it owns and the side effects it drives.
//!
//! # Concepts
//!
//! - A [`ConsentTree`] groups [`CookieOption`]s under [`CookieCategory`]s.
//!   Protected entries cannot be changed by the user.
//! - A [`ConsentStatus`] records whether the user has decided yet.
//! - The [`ConsentStore`] applies user actions to the tree, persists tree and
//!   status through [`StorageHandles`](crate::storage::StorageHandles), and
//!   asks a [`Reconciler`] to bring the document in line.
//!
//! # Example
//!
//! ```rust
//! use cookie_consent::config::ConsentConfig;
//! use cookie_consent::consent::{ConsentStatus, ConsentStore, HeadlessDocument};
//! use cookie_consent::storage::StorageHandles;
//!
//! let mut store = ConsentStore::new(
//!     ConsentConfig::default(),
//!     StorageHandles::in_memory(),
//!     HeadlessDocument::default(),
//! );
//! store.initialize();
//! assert!(store.needs_prompt());
//!
//! store.toggle("transitions");
//! store.save_preferences();
//! assert_eq!(store.status(), ConsentStatus::Accepted);
//! assert!(store.is_active("performance"));
//! ```

mod defaults;
mod event;
mod model;
mod reconcile;
mod snapshot;
mod store;

pub use defaults::default_tree;
pub use event::{ConsentEvent, Subscription, DEFAULT_CHANNEL_CAPACITY};
pub use model::{ConsentStatus, ConsentTree, CookieCategory, CookieOption, UnknownStatus};
pub use reconcile::{DocumentHost, HeadlessDocument, Reconciler, StylesheetRule, Theme};
pub use snapshot::{encode_snapshot, merge_snapshot, read_snapshot, SavedCategory, SavedOption, SnapshotRead};
pub use store::ConsentStore;
