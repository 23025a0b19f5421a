//! Consent configuration.
//!
//! `ConsentConfig` controls where a [`ConsentStore`](crate::consent::ConsentStore)
//! keeps its state (storage keys and cookie attributes) and which options drive
//! side effects (stylesheets, theme and storage clearing).
//!
//! `ConsentConfig` provides defaults matching the widget's historical storage
//! format via [`Default`] and a fluent [`ConsentConfig::builder()`] with
//! validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use cookie_consent::config::ConsentConfig;
//! let cfg = ConsentConfig::default();
//! assert_eq!(cfg.status_key, "cookie-accepted");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use cookie_consent::config::ConsentConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ConsentConfig::builder()
//!     .status_key("consent-status")
//!     .snapshot_key("consent-tree")
//!     .max_age(time::Duration::days(365))
//!     .secure(true)
//!     .build()?; // returns Result<ConsentConfig, ConsentConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `status_key`: key of the persisted status flag (default: `cookie-accepted`).
//! - `snapshot_key`: key of the persisted tree snapshot (default: `cookie-preferences`).
//! - `max_age`: lifetime of both persisted values (default: two years).
//! - `cookie_path`: path scope of the persisted cookies (default: `/`).
//! - `same_site`: `SameSite` attribute (default: `Lax`).
//! - `secure`: emit the `Secure` attribute.
//! - `stylesheets`: option-driven stylesheet rules.
//! - `prefers_option`: option gating device theme application.
//! - `local_storage_option`: option whose withdrawal clears snapshot storage.
//!
//! # Errors
//!
//! Builder validation returns [`ConsentConfigError`] for empty or colliding
//! keys, a non-positive `max_age`, a relative `cookie_path` or duplicated
//! stylesheet resource ids.

use std::collections::HashSet;
use std::fmt;

use crate::consent::StylesheetRule;
use crate::storage::SameSite;

const DEFAULT_STATUS_KEY: &str = "cookie-accepted";
const DEFAULT_SNAPSHOT_KEY: &str = "cookie-preferences";

#[derive(Debug, Clone)]
pub struct ConsentConfig {
    pub status_key: String,
    pub snapshot_key: String,
    pub max_age: time::Duration,
    pub cookie_path: String,
    pub same_site: SameSite,
    pub secure: bool,
    pub stylesheets: Vec<StylesheetRule>,
    pub prefers_option: String,
    pub local_storage_option: String,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            status_key: DEFAULT_STATUS_KEY.to_string(),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            max_age: time::Duration::days(2 * 365),
            cookie_path: "/".to_string(),
            same_site: SameSite::Lax,
            secure: false,
            stylesheets: vec![
                StylesheetRule::new("transitions", "transitions-css", "/css/transitions.css"),
                StylesheetRule::new("section-pagination", "scroll-css", "/css/scroll.css"),
            ],
            prefers_option: "prefers".to_string(),
            local_storage_option: "localstorage".to_string(),
        }
    }
}

impl ConsentConfig {
    pub fn builder() -> ConsentConfigBuilder {
        ConsentConfigBuilder::default()
    }
}

/// Builder for [`ConsentConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConsentConfigBuilder {
    inner: ConsentConfig,
}

impl ConsentConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ConsentConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn status_key<S: Into<String>>(self, key: S) -> Self { self.map(|c| c.status_key = key.into()) }
    pub fn snapshot_key<S: Into<String>>(self, key: S) -> Self { self.map(|c| c.snapshot_key = key.into()) }
    pub fn max_age(self, age: time::Duration) -> Self { self.map(|c| c.max_age = age) }
    pub fn cookie_path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.cookie_path = path.into()) }
    pub fn same_site(self, same_site: SameSite) -> Self { self.map(|c| c.same_site = same_site) }
    pub fn secure(self, on: bool) -> Self { self.map(|c| c.secure = on) }
    pub fn stylesheet(self, rule: StylesheetRule) -> Self { self.map(|c| c.stylesheets.push(rule)) }
    pub fn stylesheets(self, rules: Vec<StylesheetRule>) -> Self { self.map(|c| c.stylesheets = rules) }
    pub fn prefers_option<S: Into<String>>(self, id: S) -> Self { self.map(|c| c.prefers_option = id.into()) }
    pub fn local_storage_option<S: Into<String>>(self, id: S) -> Self { self.map(|c| c.local_storage_option = id.into()) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ConsentConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ConsentConfig, ConsentConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum ConsentConfigError {
    EmptyKey(&'static str),
    KeyCollision(String),
    NonPositiveMaxAge(time::Duration),
    RelativeCookiePath(String),
    DuplicateStylesheet(String),
}

impl fmt::Display for ConsentConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsentConfigError::EmptyKey(field) =>
                write!(f, "{field} must not be empty"),
            ConsentConfigError::KeyCollision(key) =>
                write!(f, "status_key and snapshot_key are both '{key}'"),
            ConsentConfigError::NonPositiveMaxAge(age) =>
                write!(f, "max_age {age} must be positive"),
            ConsentConfigError::RelativeCookiePath(path) =>
                write!(f, "cookie_path '{path}' must start with '/'"),
            ConsentConfigError::DuplicateStylesheet(id) =>
                write!(f, "stylesheet id '{id}' is used by more than one rule"),
        }
    }
}
impl std::error::Error for ConsentConfigError {}

fn validate(c: &ConsentConfig) -> Result<(), ConsentConfigError> {
    if c.status_key.trim().is_empty() {
        return Err(ConsentConfigError::EmptyKey("status_key"));
    }
    if c.snapshot_key.trim().is_empty() {
        return Err(ConsentConfigError::EmptyKey("snapshot_key"));
    }
    if c.status_key == c.snapshot_key {
        return Err(ConsentConfigError::KeyCollision(c.status_key.clone()));
    }
    if !c.max_age.is_positive() {
        return Err(ConsentConfigError::NonPositiveMaxAge(c.max_age));
    }
    if !c.cookie_path.starts_with('/') {
        return Err(ConsentConfigError::RelativeCookiePath(c.cookie_path.clone()));
    }

    let mut seen = HashSet::new();
    for rule in &c.stylesheets {
        if !seen.insert(rule.id.as_str()) {
            return Err(ConsentConfigError::DuplicateStylesheet(rule.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ConsentConfig::default();
        assert!(validate(&cfg).is_ok());
        assert_eq!(cfg.snapshot_key, "cookie-preferences");
        assert_eq!(cfg.max_age, time::Duration::days(730));
        assert_eq!(cfg.stylesheets.len(), 2);
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConsentConfig::builder()
            .status_key("s")
            .snapshot_key("t")
            .secure(true)
            .same_site(SameSite::Strict)
            .build()
            .unwrap();
        assert_eq!(cfg.status_key, "s");
        assert_eq!(cfg.snapshot_key, "t");
        assert!(cfg.secure);
        assert_eq!(cfg.same_site, SameSite::Strict);
    }

    #[test]
    fn rejects_empty_and_colliding_keys() {
        let err = ConsentConfig::builder().status_key("  ").build().unwrap_err();
        assert_eq!(err, ConsentConfigError::EmptyKey("status_key"));

        let err = ConsentConfig::builder().status_key("same").snapshot_key("same").build().unwrap_err();
        assert_eq!(err, ConsentConfigError::KeyCollision("same".into()));
    }

    #[test]
    fn rejects_bad_max_age_and_path() {
        let err = ConsentConfig::builder().max_age(time::Duration::ZERO).build().unwrap_err();
        assert!(matches!(err, ConsentConfigError::NonPositiveMaxAge(_)));

        let err = ConsentConfig::builder().cookie_path("app").build().unwrap_err();
        assert_eq!(err, ConsentConfigError::RelativeCookiePath("app".into()));
    }

    #[test]
    fn rejects_duplicate_stylesheet_ids() {
        let err = ConsentConfig::builder()
            .stylesheet(StylesheetRule::new("blur", "transitions-css", "/css/blur.css"))
            .build()
            .unwrap_err();
        assert_eq!(err, ConsentConfigError::DuplicateStylesheet("transitions-css".into()));
        assert!(err.to_string().contains("transitions-css"));
    }
}
