//! Persisted tree snapshot.
//!
//! The snapshot is a JSON array holding only what changes at runtime:
//!
//! ```json
//! [{"id":1,"value":true,"protected":false,"options":[{"id":1,"value":true,"protected":false}]}]
//! ```
//!
//! Reading never fails: [`read_snapshot`] returns a [`SnapshotRead`] tag and
//! callers fall back to defaults on anything but [`SnapshotRead::Loaded`].
//! [`merge_snapshot`] applies a loaded snapshot onto a tree by category `id`,
//! then option `id` within the matching category. Fields missing from the
//! snapshot keep their defaults, and protected entries keep their default
//! value whatever the snapshot says.

use serde::{Deserialize, Serialize};

use crate::consent::model::ConsentTree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedOption {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCategory {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SavedOption>>,
}

/// Outcome of reading a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotRead {
    /// Nothing stored under the key.
    Missing,
    /// Parsed and schema-valid.
    Loaded(Vec<SavedCategory>),
    /// Present but unusable; carries the parse error for logging.
    Malformed(String),
}

pub fn read_snapshot(raw: Option<&str>) -> SnapshotRead {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return SnapshotRead::Missing,
    };

    match serde_json::from_str::<Vec<SavedCategory>>(raw) {
        Ok(saved) => SnapshotRead::Loaded(saved),
        Err(e) => SnapshotRead::Malformed(e.to_string()),
    }
}

/// Captures the runtime state of `tree`.
pub fn snapshot_of(tree: &ConsentTree) -> Vec<SavedCategory> {
    tree.categories()
        .iter()
        .map(|c| SavedCategory {
            id: c.id,
            value: Some(c.value),
            protected: Some(c.protected),
            options: Some(
                c.options
                    .iter()
                    .map(|o| SavedOption {
                        id: o.id,
                        value: Some(o.value),
                        protected: Some(o.protected),
                    })
                    .collect(),
            ),
        })
        .collect()
}

pub fn encode_snapshot(tree: &ConsentTree) -> Result<String, serde_json::Error> {
    serde_json::to_string(&snapshot_of(tree))
}

/// Applies `saved` onto `tree`. Returns how many values were taken from the snapshot.
pub fn merge_snapshot(tree: &mut ConsentTree, saved: &[SavedCategory]) -> usize {
    let mut applied = 0;

    for category in tree.categories_mut() {
        let Some(saved_cat) = saved.iter().find(|s| s.id == category.id) else {
            continue;
        };

        if let (Some(value), false) = (saved_cat.value, category.protected) {
            category.value = value;
            applied += 1;
        }

        let Some(saved_opts) = &saved_cat.options else {
            continue;
        };
        for option in category.options.iter_mut().filter(|o| !o.protected) {
            if let Some(value) = saved_opts.iter().find(|s| s.id == option.id).and_then(|s| s.value) {
                option.value = value;
                applied += 1;
            }
        }
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::defaults::default_tree;

    #[test]
    fn missing_and_blank_are_missing() {
        assert_eq!(read_snapshot(None), SnapshotRead::Missing);
        assert_eq!(read_snapshot(Some("  ")), SnapshotRead::Missing);
    }

    #[test]
    fn shape_mismatch_is_malformed() {
        assert!(matches!(read_snapshot(Some("{not json")), SnapshotRead::Malformed(_)));
        assert!(matches!(read_snapshot(Some(r#"{"id":1}"#)), SnapshotRead::Malformed(_)));
        assert!(matches!(read_snapshot(Some(r#"[{"value":true}]"#)), SnapshotRead::Malformed(_)));
        assert!(matches!(read_snapshot(Some(r#"[{"id":1,"value":"yes"}]"#)), SnapshotRead::Malformed(_)));
    }

    #[test]
    fn partial_entries_are_loaded() {
        let read = read_snapshot(Some(r#"[{"id":3,"options":[{"id":11,"value":true}]},{"id":1}]"#));
        let SnapshotRead::Loaded(saved) = read else { panic!("expected Loaded") };
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].value, None);
        assert_eq!(saved[0].options.as_ref().unwrap()[0].value, Some(true));
    }

    #[test]
    fn merge_keeps_defaults_for_absent_fields() {
        let mut tree = default_tree();
        let saved = vec![SavedCategory {
            id: 3,
            value: None,
            protected: None,
            options: Some(vec![SavedOption { id: 11, value: Some(true), protected: None }]),
        }];

        assert_eq!(merge_snapshot(&mut tree, &saved), 1);
        assert!(tree.is_active("transitions"));
        assert!(!tree.is_active("performance"));
        assert!(!tree.is_active("blur"));
    }

    #[test]
    fn merge_ignores_unknown_ids_and_protected_entries() {
        let mut tree = default_tree();
        let saved = vec![
            SavedCategory { id: 99, value: Some(true), protected: None, options: None },
            SavedCategory {
                id: 2,
                value: Some(true),
                protected: Some(true),
                options: Some(vec![
                    SavedOption { id: 1, value: Some(false), protected: Some(false) },
                    SavedOption { id: 42, value: Some(true), protected: None },
                ]),
            },
        ];

        assert_eq!(merge_snapshot(&mut tree, &saved), 1);
        assert!(tree.is_active("socials"));
        assert!(tree.is_active("google"));
        assert!(tree.option("google").unwrap().protected);
        assert!(!tree.category("socials").unwrap().protected);
    }

    #[test]
    fn encoded_snapshot_reloads_onto_fresh_tree() {
        let mut tree = default_tree();
        tree.set_all_unprotected(true);
        let raw = encode_snapshot(&tree).unwrap();
        assert!(raw.starts_with(r#"[{"id":1,"value":true,"protected":false,"options":[{"id":1"#));

        let SnapshotRead::Loaded(saved) = read_snapshot(Some(&raw)) else { panic!("expected Loaded") };
        let mut fresh = default_tree();
        merge_snapshot(&mut fresh, &saved);
        assert_eq!(fresh, tree);
    }
}
