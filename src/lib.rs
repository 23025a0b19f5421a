//! Cookie-consent engine.
//!
//! Tracks consent for categorized cookie groups, persists the decision and
//! drives the document-level side effects that depend on it.
//!
//! - [`consent`] — the [`ConsentStore`](consent::ConsentStore) and its tree.
//! - [`storage`] — key/value backends the store persists through.
//! - [`bootstrap`] — reading the status flag before the store exists.
//! - [`config`] — keys, cookie attributes and side-effect rules.

pub mod bootstrap;
pub mod config;
pub mod consent;
pub mod errors;
pub mod ffi;
pub mod storage;

pub use config::{ConsentConfig, ConsentConfigError};
pub use consent::{ConsentStatus, ConsentStore, ConsentTree};
pub use errors::ConsentError;
