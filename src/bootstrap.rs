//! Pre-hydration access to the status flag.
//!
//! A page bootstrap script runs before any [`ConsentStore`](crate::consent::ConsentStore)
//! exists and decides whether to show the page-load placeholder. It reads
//! the raw `document.cookie` string, so it must agree with the key and
//! encoding the store writes through a [`CookieArea`](crate::storage::CookieArea).
//! These helpers are that agreement.

use crate::config::ConsentConfig;
use crate::consent::ConsentStatus;
use crate::storage::cookie_area::{decode_value, parse_cookie_pairs};

/// Reads the status flag stored under `key` in a `document.cookie` string.
///
/// Returns `None` when the cookie is absent or does not hold a known status.
pub fn read_status_flag(cookie_str: &str, key: &str) -> Option<ConsentStatus> {
    let (_, raw) = parse_cookie_pairs(cookie_str).into_iter().find(|(name, _)| name == key)?;
    match decode_value(&raw).parse() {
        Ok(status) => Some(status),
        Err(e) => {
            log::debug!("bootstrap: ignoring status flag: {}", e);
            None
        }
    }
}

/// Whether the page-load placeholder should be shown: only once the user has accepted.
pub fn should_show_loader(cookie_str: &str, config: &ConsentConfig) -> bool {
    read_status_flag(cookie_str, &config.status_key) == Some(ConsentStatus::Accepted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::consent::{ConsentStore, HeadlessDocument};
    use crate::storage::{CookieArea, CookieAttributes, StorageHandles};

    #[test]
    fn reads_flag_among_other_cookies() {
        let cookies = "theme=dark; cookie-accepted=rejected; other=1";
        assert_eq!(read_status_flag(cookies, "cookie-accepted"), Some(ConsentStatus::Rejected));
        assert_eq!(read_status_flag(cookies, "missing"), None);
        assert_eq!(read_status_flag("cookie-accepted=true", "cookie-accepted"), None);
        assert_eq!(read_status_flag("", "cookie-accepted"), None);
    }

    #[test]
    fn loader_only_after_accept() {
        let cfg = ConsentConfig::default();
        assert!(should_show_loader("cookie-accepted=accepted", &cfg));
        assert!(!should_show_loader("cookie-accepted=waiting", &cfg));
        assert!(!should_show_loader("cookie-accepted=rejected", &cfg));
        assert!(!should_show_loader("", &cfg));
    }

    #[test]
    fn agrees_with_what_the_store_writes() {
        let cfg = ConsentConfig::default();
        let cookies = Arc::new(CookieArea::new(CookieAttributes::from_config(&cfg)));
        let mut store = ConsentStore::new(cfg.clone(), StorageHandles::shared(cookies.clone()), HeadlessDocument::default());
        store.initialize();
        assert!(!should_show_loader(&cookies.document_cookie(), &cfg));

        store.accept_all();
        assert!(should_show_loader(&cookies.document_cookie(), &cfg));

        store.reject_all();
        assert_eq!(read_status_flag(&cookies.document_cookie(), &cfg.status_key), Some(ConsentStatus::Rejected));
        assert!(!should_show_loader(&cookies.document_cookie(), &cfg));
    }
}
