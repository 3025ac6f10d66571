use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub const DEFAULT_CATEGORY: &str = "default";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("invalid category name {0:?}: use letters, digits, '_' or '-'")]
    InvalidName(String),
}

pub fn validate_category_name(name: &str) -> Result<(), CategoryError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if valid {
        Ok(())
    } else {
        Err(CategoryError::InvalidName(name.to_string()))
    }
}

/// Known category names. Always contains [`DEFAULT_CATEGORY`] and never
/// shrinks on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeSet<String>", into = "BTreeSet<String>")]
pub struct CategorySet {
    names: BTreeSet<String>,
}

impl Default for CategorySet {
    fn default() -> Self {
        let mut names = BTreeSet::new();
        names.insert(DEFAULT_CATEGORY.to_string());
        Self { names }
    }
}

impl From<BTreeSet<String>> for CategorySet {
    fn from(value: BTreeSet<String>) -> Self {
        let mut set = Self::default();
        set.names.extend(value);
        set
    }
}

impl From<CategorySet> for BTreeSet<String> {
    fn from(value: CategorySet) -> Self {
        value.names
    }
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the name was not known before.
    pub fn create(&mut self, name: &str) -> Result<bool, CategoryError> {
        validate_category_name(name)?;
        Ok(self.names.insert(name.to_string()))
    }

    /// Records a name seen on disk or on a record without validating it.
    pub(crate) fn observe(&mut self, name: &str) {
        if !self.names.contains(name) {
            self.names.insert(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn to_set(&self) -> BTreeSet<String> {
        self.names.clone()
    }
}
