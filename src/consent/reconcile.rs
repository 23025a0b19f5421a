//! Side-effect reconciliation.
//!
//! The consent tree drives a handful of document-level effects: stylesheets
//! that exist only while an option is active, classes on the root element,
//! and the color theme. The store does not touch a document itself; it hands
//! the tree to a [`Reconciler`], which applies the effects through a
//! [`DocumentHost`].
//!
//! Reconciliation is a function of the tree and the host's current state. It
//! checks before acting, so running it twice with the same tree has the same
//! result as running it once.
//!
//! [`HeadlessDocument`] is an in-memory host used when no real document is
//! attached (tests, server-side rendering, the C ABI).

use std::collections::BTreeSet;

use crate::config::ConsentConfig;
use crate::consent::model::ConsentTree;

/// Color theme applied to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    Dark,
}

/// A stylesheet present only while `option` is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetRule {
    /// Identifier of the driving option (or category).
    pub option: String,
    /// Element id of the `<link>` resource.
    pub id: String,
    pub href: String,
}

impl StylesheetRule {
    pub fn new(option: &str, id: &str, href: &str) -> Self {
        Self {
            option: option.to_string(),
            id: id.to_string(),
            href: href.to_string(),
        }
    }
}

/// The document the consent widget lives in.
pub trait DocumentHost {
    fn has_stylesheet(&self, id: &str) -> bool;
    fn insert_stylesheet(&mut self, id: &str, href: &str);
    fn remove_stylesheet(&mut self, id: &str);

    fn has_class(&self, class: &str) -> bool;
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);

    /// The device's preferred color scheme (`prefers-color-scheme`).
    fn preferred_theme(&self) -> Theme;
    /// The theme currently applied, if any.
    fn current_theme(&self) -> Option<Theme>;
    fn apply_theme(&mut self, theme: Theme);
}

/// Applies the tree's side effects to a [`DocumentHost`].
#[derive(Debug, Clone)]
pub struct Reconciler {
    stylesheets: Vec<StylesheetRule>,
    prefers_option: String,
}

impl Reconciler {
    pub fn new(config: &ConsentConfig) -> Self {
        Self {
            stylesheets: config.stylesheets.clone(),
            prefers_option: config.prefers_option.clone(),
        }
    }

    /// Stylesheets and classes, then theme.
    pub fn reconcile(&self, tree: &ConsentTree, host: &mut dyn DocumentHost) {
        self.reconcile_classes(tree, host);
        self.reconcile_stylesheets(tree, host);
        self.reconcile_theme(tree, host);
    }

    /// Category classes are present while the category is on; option classes
    /// while the option is off.
    pub fn reconcile_classes(&self, tree: &ConsentTree, host: &mut dyn DocumentHost) {
        for category in tree.categories() {
            if let Some(class) = &category.class {
                set_class(host, class, category.value);
            }
            for option in &category.options {
                if let Some(class) = &option.class {
                    set_class(host, class, !option.value);
                }
            }
        }
    }

    pub fn reconcile_stylesheets(&self, tree: &ConsentTree, host: &mut dyn DocumentHost) {
        for rule in &self.stylesheets {
            let active = tree.is_active(&rule.option);
            let present = host.has_stylesheet(&rule.id);
            if active && !present {
                log::debug!("inserting stylesheet {} ({})", rule.id, rule.href);
                host.insert_stylesheet(&rule.id, &rule.href);
            } else if !active && present {
                log::debug!("removing stylesheet {}", rule.id);
                host.remove_stylesheet(&rule.id);
            }
        }
    }

    /// Applies the device theme while the device-preference option is active.
    /// Otherwise leaves the theme alone.
    pub fn reconcile_theme(&self, tree: &ConsentTree, host: &mut dyn DocumentHost) {
        if !tree.is_active(&self.prefers_option) {
            return;
        }
        let wanted = host.preferred_theme();
        if host.current_theme() != Some(wanted) {
            log::debug!("applying device theme {:?}", wanted);
            host.apply_theme(wanted);
        }
    }
}

fn set_class(host: &mut dyn DocumentHost, class: &str, present: bool) {
    match (present, host.has_class(class)) {
        (true, false) => host.add_class(class),
        (false, true) => host.remove_class(class),
        _ => {}
    }
}

/// In-memory document.
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    /// `(id, href)` in insertion order.
    stylesheets: Vec<(String, String)>,
    classes: BTreeSet<String>,
    preferred: Theme,
    theme: Option<Theme>,
    /// Number of mutating calls received, for observing idempotence.
    mutations: usize,
}

impl HeadlessDocument {
    pub fn new(preferred: Theme) -> Self {
        Self {
            stylesheets: Vec::new(),
            classes: BTreeSet::new(),
            preferred,
            theme: None,
            mutations: 0,
        }
    }

    pub fn stylesheets(&self) -> &[(String, String)] {
        &self.stylesheets
    }

    pub fn stylesheet_count(&self, id: &str) -> usize {
        self.stylesheets.iter().filter(|(sid, _)| sid == id).count()
    }

    pub fn classes(&self) -> Vec<&str> {
        self.classes.iter().map(String::as_str).collect()
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn set_preferred_theme(&mut self, theme: Theme) {
        self.preferred = theme;
    }

    pub fn mutations(&self) -> usize {
        self.mutations
    }
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new(Theme::Light)
    }
}

impl DocumentHost for HeadlessDocument {
    fn has_stylesheet(&self, id: &str) -> bool {
        self.stylesheets.iter().any(|(sid, _)| sid == id)
    }

    fn insert_stylesheet(&mut self, id: &str, href: &str) {
        self.mutations += 1;
        self.stylesheets.push((id.to_string(), href.to_string()));
    }

    fn remove_stylesheet(&mut self, id: &str) {
        self.mutations += 1;
        self.stylesheets.retain(|(sid, _)| sid != id);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn add_class(&mut self, class: &str) {
        self.mutations += 1;
        self.classes.insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.mutations += 1;
        self.classes.remove(class);
    }

    fn preferred_theme(&self) -> Theme {
        self.preferred
    }

    fn current_theme(&self) -> Option<Theme> {
        self.theme
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.mutations += 1;
        self.theme = Some(theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::defaults::default_tree;

    fn reconciler() -> Reconciler {
        Reconciler::new(&ConsentConfig::default())
    }

    fn enable(tree: &mut ConsentTree, ids: &[&str]) {
        for category in tree.categories_mut() {
            for option in category.options.iter_mut() {
                if ids.contains(&option.identifier.as_str()) {
                    option.value = true;
                }
            }
        }
    }

    #[test]
    fn stylesheet_follows_option() {
        let r = reconciler();
        let mut tree = default_tree();
        let mut doc = HeadlessDocument::default();

        r.reconcile(&tree, &mut doc);
        assert_eq!(doc.stylesheet_count("transitions-css"), 0);

        enable(&mut tree, &["transitions"]);
        r.reconcile(&tree, &mut doc);
        assert_eq!(doc.stylesheet_count("transitions-css"), 1);
        assert_eq!(doc.stylesheets()[0].1, "/css/transitions.css");
        assert_eq!(doc.stylesheet_count("scroll-css"), 0);

        let mut tree = default_tree();
        tree.set_all_unprotected(false);
        r.reconcile(&tree, &mut doc);
        assert_eq!(doc.stylesheet_count("transitions-css"), 0);
    }

    #[test]
    fn reconcile_twice_keeps_exactly_one_stylesheet() {
        let r = reconciler();
        let mut tree = default_tree();
        enable(&mut tree, &["transitions", "section-pagination", "prefers"]);
        let mut doc = HeadlessDocument::new(Theme::Dark);

        r.reconcile(&tree, &mut doc);
        let after_first = doc.mutations();
        r.reconcile(&tree, &mut doc);

        assert_eq!(doc.stylesheet_count("transitions-css"), 1);
        assert_eq!(doc.stylesheet_count("scroll-css"), 1);
        assert_eq!(doc.mutations(), after_first);
    }

    #[test]
    fn classes_mark_categories_on_and_options_off() {
        let r = reconciler();
        let mut tree = default_tree();
        let mut doc = HeadlessDocument::default();

        r.reconcile(&tree, &mut doc);
        assert_eq!(doc.classes(), vec!["a", "b", "t"]);

        tree.set_all_unprotected(true);
        r.reconcile(&tree, &mut doc);
        assert_eq!(doc.classes(), vec!["m", "p", "s"]);
    }

    #[test]
    fn theme_follows_prefers_option() {
        let r = reconciler();
        let mut tree = default_tree();
        let mut doc = HeadlessDocument::new(Theme::Dark);

        enable(&mut tree, &["themes"]);
        r.reconcile(&tree, &mut doc);
        assert_eq!(doc.theme(), None);

        enable(&mut tree, &["prefers"]);
        r.reconcile(&tree, &mut doc);
        assert_eq!(doc.theme(), Some(Theme::Dark));

        doc.set_preferred_theme(Theme::Light);
        r.reconcile(&tree, &mut doc);
        assert_eq!(doc.theme(), Some(Theme::Light));
    }
}
