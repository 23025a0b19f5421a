//! Cookie-backed storage area.
//!
//! [`CookieArea`] keeps every item as a [`CookieRecord`] carrying the
//! attributes a browser would store (`Path`, `Max-Age`, `SameSite`,
//! `Secure`). It renders two views of its content:
//!
//! - [`CookieArea::document_cookie`]: the `name=value; name=value` string
//!   scripts see through `document.cookie`;
//! - [`CookieArea::set_cookie_header`]: a full `Set-Cookie` header for one
//!   record, for hosts that persist through HTTP responses.
//!
//! Values are form-url-encoded on the way in and decoded on the way out, so
//! JSON payloads survive the `;`/`,` separators of the cookie grammar.
//!
//! ## Notes & limitations
//! - Expiry is recorded but not enforced; the host's cookie jar does that.
//! - Domain scoping is left to the host (host-only cookies).

use std::fmt;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use url::form_urlencoded;

use crate::config::ConsentConfig;
use crate::storage::area::StorageArea;

/// `SameSite` cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// Attributes applied to every cookie written by a [`CookieArea`].
#[derive(Debug, Clone, PartialEq)]
pub struct CookieAttributes {
    pub path: String,
    pub max_age: time::Duration,
    pub same_site: SameSite,
    pub secure: bool,
}

impl CookieAttributes {
    pub fn from_config(config: &ConsentConfig) -> Self {
        Self {
            path: config.cookie_path.clone(),
            max_age: config.max_age,
            same_site: config.same_site,
            secure: config.secure,
        }
    }
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self::from_config(&ConsentConfig::default())
    }
}

/// A cookie as stored by a [`CookieArea`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieRecord {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Decoded value.
    pub value: String,

    pub path: String,

    /// Lifetime in seconds.
    pub max_age: i64,

    /// Expiration timestamp (RFC 3339), derived from `max_age` at write time.
    pub expires: Option<String>,

    pub same_site: SameSite,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,
}

impl CookieRecord {
    fn new(name: &str, value: &str, attrs: &CookieAttributes) -> Self {
        let expires = (OffsetDateTime::now_utc() + attrs.max_age).format(&Rfc3339).ok();
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: attrs.path.clone(),
            max_age: attrs.max_age.whole_seconds(),
            expires,
            same_site: attrs.same_site,
            secure: attrs.secure,
        }
    }

    /// Renders the record as a `Set-Cookie` header value.
    pub fn to_header(&self) -> String {
        let mut header = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            encode_value(&self.value),
            self.path,
            self.max_age,
            self.same_site
        );
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

/// Encodes a cookie value.
pub fn encode_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Decodes a cookie value written by [`encode_value`]. Plain values pass through.
pub fn decode_value(raw: &str) -> String {
    form_urlencoded::parse(format!("v={raw}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// Splits a `document.cookie` / `Cookie:` header string into raw `(name, value)` pairs.
///
/// Values are returned undecoded; segments without `=` are skipped.
pub fn parse_cookie_pairs(cookie_str: &str) -> Vec<(String, String)> {
    cookie_str
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Storage area that stores items as cookies.
pub struct CookieArea {
    attrs: CookieAttributes,
    records: Mutex<Vec<CookieRecord>>,
}

impl CookieArea {
    pub fn new(attrs: CookieAttributes) -> Self {
        Self {
            attrs,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Seeds an area from an existing `document.cookie` string.
    pub fn from_document_cookie(cookie_str: &str, attrs: CookieAttributes) -> Self {
        let records = parse_cookie_pairs(cookie_str)
            .into_iter()
            .map(|(name, raw)| CookieRecord::new(&name, &decode_value(&raw), &attrs))
            .collect();
        Self {
            attrs,
            records: Mutex::new(records),
        }
    }

    pub fn attributes(&self) -> &CookieAttributes {
        &self.attrs
    }

    /// Returns the `document.cookie` view: `name=value` pairs joined by `"; "`.
    pub fn document_cookie(&self) -> String {
        match self.records.lock() {
            Ok(records) => records
                .iter()
                .map(|c| format!("{}={}", c.name, encode_value(&c.value)))
                .collect::<Vec<_>>()
                .join("; "),
            Err(_) => String::new(),
        }
    }

    /// Returns the `Set-Cookie` header value for `name`, if present.
    pub fn set_cookie_header(&self, name: &str) -> Option<String> {
        let records = self.records.lock().ok()?;
        records.iter().find(|c| c.name == name).map(CookieRecord::to_header)
    }

    /// Returns a copy of the record stored under `name`.
    pub fn record(&self, name: &str) -> Option<CookieRecord> {
        let records = self.records.lock().ok()?;
        records.iter().find(|c| c.name == name).cloned()
    }
}

impl StorageArea for CookieArea {
    fn get_item(&self, key: &str) -> Option<String> {
        let records = self.records.lock().ok()?;
        records.iter().find(|c| c.name == key).map(|c| c.value.clone())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let cookie = CookieRecord::new(key, value, &self.attrs);
        let mut records = self.records.lock().map_err(|_| anyhow!("cookie area lock poisoned"))?;

        // Replace existing cookie with same name
        if let Some(existing) = records.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            records.push(cookie);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| anyhow!("cookie area lock poisoned"))?;
        records.retain(|c| c.name != key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.records.lock().map_err(|_| anyhow!("cookie area lock poisoned"))?.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn keys(&self) -> Vec<String> {
        let mut v: Vec<String> = match self.records.lock() {
            Ok(r) => r.iter().map(|c| c.name.clone()).collect(),
            Err(_) => return vec![],
        };
        v.sort_unstable();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::area::contract::assert_basic_contract;

    #[test]
    fn area_contract() {
        assert_basic_contract(&CookieArea::new(CookieAttributes::default()));
    }

    #[test]
    fn records_carry_configured_attributes() {
        let area = CookieArea::new(CookieAttributes::default());
        area.set_item("cookie-accepted", "accepted").unwrap();

        let record = area.record("cookie-accepted").unwrap();
        assert_eq!(record.path, "/");
        assert_eq!(record.max_age, 2 * 365 * 24 * 60 * 60);
        assert_eq!(record.same_site, SameSite::Lax);
        assert!(!record.secure);
        assert!(record.expires.is_some());
    }

    #[test]
    fn set_cookie_header_renders_attributes() {
        let attrs = CookieAttributes {
            secure: true,
            same_site: SameSite::Strict,
            ..CookieAttributes::default()
        };
        let area = CookieArea::new(attrs);
        area.set_item("cookie-accepted", "rejected").unwrap();

        let header = area.set_cookie_header("cookie-accepted").unwrap();
        assert_eq!(
            header,
            "cookie-accepted=rejected; Path=/; Max-Age=63072000; SameSite=Strict; Secure"
        );
        assert!(area.set_cookie_header("missing").is_none());
    }

    #[test]
    fn json_values_survive_document_cookie_round_trip() {
        let area = CookieArea::new(CookieAttributes::default());
        let json = r#"[{"id":1,"value":true,"options":[]}]"#;
        area.set_item("cookie-preferences", json).unwrap();
        area.set_item("cookie-accepted", "accepted").unwrap();

        let doc = area.document_cookie();
        assert!(!doc.contains('"'));
        assert!(doc.contains("cookie-accepted=accepted"));

        let reseeded = CookieArea::from_document_cookie(&doc, CookieAttributes::default());
        assert_eq!(reseeded.get_item("cookie-preferences").as_deref(), Some(json));
        assert_eq!(reseeded.get_item("cookie-accepted").as_deref(), Some("accepted"));
    }

    #[test]
    fn parse_pairs_skips_garbage() {
        let pairs = parse_cookie_pairs(" a=1; junk ;=nope; b = 2 ;");
        assert_eq!(
            pairs,
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn decode_passes_plain_values_through() {
        assert_eq!(decode_value("accepted"), "accepted");
        assert_eq!(decode_value(&encode_value("a b;c=d")), "a b;c=d");
    }
}
