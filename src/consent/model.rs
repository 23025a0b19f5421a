//! Consent tree data types.
//!
//! A [`ConsentTree`] is an ordered list of [`CookieCategory`] values, each
//! holding an ordered list of [`CookieOption`] values. Identifiers are unique
//! across the whole tree (categories and options share one namespace), which
//! [`ConsentTree::new`] enforces.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConsentError;

/// A leaf preference inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOption {
    /// Unique within the owning category.
    pub id: u32,
    pub identifier: String,
    pub display_name: String,
    /// Protected options cannot be changed by user actions.
    pub protected: bool,
    pub value: bool,
    /// Document class present while this option is *off*.
    pub class: Option<String>,
}

impl CookieOption {
    pub fn new(id: u32, identifier: &str, display_name: &str) -> Self {
        Self {
            id,
            identifier: identifier.to_string(),
            display_name: display_name.to_string(),
            protected: false,
            value: false,
            class: None,
        }
    }

    /// Marks the option protected with a fixed value.
    pub fn protected(mut self, value: bool) -> Self {
        self.protected = true;
        self.value = value;
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }
}

/// A group of related options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieCategory {
    /// Unique within the tree.
    pub id: u32,
    pub identifier: String,
    pub display_name: String,
    pub description: String,
    pub protected: bool,
    /// Aggregate consent for the group, kept in sync by the store.
    pub value: bool,
    /// Document class present while this category is on.
    pub class: Option<String>,
    pub options: Vec<CookieOption>,
}

impl CookieCategory {
    pub fn new(id: u32, identifier: &str, display_name: &str, description: &str) -> Self {
        Self {
            id,
            identifier: identifier.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            protected: false,
            value: false,
            class: None,
            options: Vec::new(),
        }
    }

    pub fn protected(mut self, value: bool) -> Self {
        self.protected = true;
        self.value = value;
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn option(mut self, option: CookieOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn find_option(&self, identifier: &str) -> Option<&CookieOption> {
        self.options.iter().find(|o| o.identifier == identifier)
    }

    /// `true` when every non-protected option is off.
    pub fn all_unprotected_off(&self) -> bool {
        self.options.iter().all(|o| o.protected || !o.value)
    }
}

/// Ordered sequence of categories; the root persisted unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConsentTree {
    categories: Vec<CookieCategory>,
}

impl ConsentTree {
    /// Builds a tree, rejecting duplicate identifiers, category ids, or option ids within a category.
    pub fn new(categories: Vec<CookieCategory>) -> Result<Self, ConsentError> {
        let mut identifiers = HashSet::new();
        let mut category_ids = HashSet::new();

        for category in &categories {
            if !category_ids.insert(category.id) {
                return Err(ConsentError::DuplicateCategoryId(category.id));
            }
            if !identifiers.insert(category.identifier.as_str()) {
                return Err(ConsentError::DuplicateIdentifier(category.identifier.clone()));
            }

            let mut option_ids = HashSet::new();
            for option in &category.options {
                if !option_ids.insert(option.id) {
                    return Err(ConsentError::DuplicateOptionId {
                        category: category.identifier.clone(),
                        option: option.id,
                    });
                }
                if !identifiers.insert(option.identifier.as_str()) {
                    return Err(ConsentError::DuplicateIdentifier(option.identifier.clone()));
                }
            }
        }

        Ok(Self { categories })
    }

    /// Wraps categories already known to be unique.
    pub(crate) fn from_validated(categories: Vec<CookieCategory>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[CookieCategory] {
        &self.categories
    }

    pub(crate) fn categories_mut(&mut self) -> &mut [CookieCategory] {
        &mut self.categories
    }

    pub fn category(&self, identifier: &str) -> Option<&CookieCategory> {
        self.categories.iter().find(|c| c.identifier == identifier)
    }

    /// First option matching `identifier`, scanning categories in order.
    pub fn option(&self, identifier: &str) -> Option<&CookieOption> {
        self.categories.iter().find_map(|c| c.find_option(identifier))
    }

    /// Category first, then options; first match wins. `false` when nothing matches.
    pub fn is_active(&self, identifier: &str) -> bool {
        if let Some(category) = self.category(identifier) {
            return category.value;
        }
        self.option(identifier).is_some_and(|o| o.value)
    }

    /// Every identifier in tree order (categories before their options).
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().flat_map(|c| {
            std::iter::once(c.identifier.as_str()).chain(c.options.iter().map(|o| o.identifier.as_str()))
        })
    }

    /// Sets every non-protected category and option to `value`.
    pub(crate) fn set_all_unprotected(&mut self, value: bool) {
        for category in &mut self.categories {
            if !category.protected {
                category.value = value;
            }
            for option in category.options.iter_mut().filter(|o| !o.protected) {
                option.value = value;
            }
        }
    }
}

/// Whether the user has made an initial decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    #[default]
    Waiting,
    Accepted,
    Rejected,
}

impl ConsentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentStatus::Waiting => "waiting",
            ConsentStatus::Accepted => "accepted",
            ConsentStatus::Rejected => "rejected",
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, ConsentStatus::Waiting)
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status flag is not one of `waiting|accepted|rejected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown consent status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ConsentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "waiting" => Ok(ConsentStatus::Waiting),
            "accepted" => Ok(ConsentStatus::Accepted),
            "rejected" => Ok(ConsentStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
