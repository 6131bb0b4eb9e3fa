//! Category vocabulary and per-meal suggestions.
//!
//! # Responsibility
//! - Hold the ordered global category vocabulary.
//! - Hold, per meal slot, the ordered list of suggested categories.
//! - Self-heal stale or malformed entries whenever a config is built.
//!
//! # Invariants
//! - Vocabulary entries are trimmed, non-empty and unique.
//! - Every meal slot has a (possibly empty) suggestion list.
//! - Every suggestion is a member of the vocabulary and appears once.

use super::menu::MealKey;
use super::validation::dedup_preserving_order;
use crate::storage::DOCUMENT_FORMAT_VERSION;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Category used as the catch-all suggestion and delete fallback.
pub const MISC_CATEGORY: &str = "Others";

const DEFAULT_CATEGORIES: &[&str] = &[
    "Protein",
    "Fish",
    "Seafood",
    "Vegetables",
    "Fruit",
    "Legumes",
    "Cereals",
    "Dairy",
    MISC_CATEGORY,
];

const DEFAULT_SUGGESTIONS: &[(MealKey, &[&str])] = &[
    (MealKey::Breakfast, &["Cereals", "Dairy", "Fruit", MISC_CATEGORY]),
    (MealKey::Midmorning, &["Fruit", "Protein", MISC_CATEGORY]),
    (
        MealKey::Lunch,
        &["Protein", "Vegetables", "Cereals", "Legumes", MISC_CATEGORY],
    ),
    (MealKey::Snack, &["Fruit", "Dairy", MISC_CATEGORY]),
    (
        MealKey::Dinner,
        &["Fish", "Protein", "Vegetables", MISC_CATEGORY],
    ),
];

/// Error raised by an in-memory category edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryEditError {
    EmptyName,
    AlreadyExists(String),
    UnknownCategory(String),
}

impl Display for CategoryEditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "category name cannot be empty"),
            Self::AlreadyExists(name) => write!(f, "category `{name}` already exists"),
            Self::UnknownCategory(name) => write!(f, "category `{name}` does not exist"),
        }
    }
}

impl Error for CategoryEditError {}

/// The category vocabulary plus per-meal suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategoryConfigRecord", into = "CategoryConfigRecord")]
pub struct CategoryConfig {
    categories: Vec<String>,
    by_meal: BTreeMap<MealKey, Vec<String>>,
}

/// Wire shape of `categories.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfigRecord {
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub by_meal: BTreeMap<String, Vec<String>>,
}

fn default_version() -> u64 {
    DOCUMENT_FORMAT_VERSION
}

impl CategoryConfig {
    /// Builds a healed config from raw parts.
    pub fn new(categories: Vec<String>, by_meal: BTreeMap<MealKey, Vec<String>>) -> Self {
        let mut config = Self {
            categories,
            by_meal,
        };
        config.heal();
        config
    }

    /// Vocabulary and suggestions written on first use.
    pub fn defaults() -> Self {
        let categories = DEFAULT_CATEGORIES.iter().map(|name| name.to_string()).collect();
        let by_meal = DEFAULT_SUGGESTIONS
            .iter()
            .map(|(meal, names)| (*meal, names.iter().map(|name| name.to_string()).collect()))
            .collect();
        Self::new(categories, by_meal)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn suggestions(&self, meal: MealKey) -> &[String] {
        self.by_meal.get(&meal).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|category| category == name)
    }

    /// Normalizes the config in place. Returns whether anything changed.
    ///
    /// Trims and dedupes the vocabulary, creates missing meal lists and
    /// drops suggestions that are absent from the vocabulary.
    pub fn heal(&mut self) -> bool {
        let mut changed = false;

        let vocabulary = dedup_preserving_order(
            self.categories
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        );
        if vocabulary != self.categories {
            self.categories = vocabulary;
            changed = true;
        }

        let known: HashSet<&str> = self.categories.iter().map(String::as_str).collect();
        for meal in MealKey::ALL {
            let current = self.by_meal.remove(&meal);
            let healed = dedup_preserving_order(
                current
                    .iter()
                    .flatten()
                    .map(|name| name.trim().to_string())
                    .filter(|name| known.contains(name.as_str())),
            );
            if current.as_ref() != Some(&healed) {
                changed = true;
            }
            self.by_meal.insert(meal, healed);
        }

        if changed {
            debug!("event=categories_heal module=model status=ok changed=true");
        }
        changed
    }

    /// Appends a new category to the vocabulary. Returns the stored name.
    pub fn add_category(&mut self, name: &str) -> Result<String, CategoryEditError> {
        let name = clean_name(name)?;
        if self.contains(&name) {
            return Err(CategoryEditError::AlreadyExists(name));
        }
        self.categories.push(name.clone());
        Ok(name)
    }

    /// Renames a category in the vocabulary and every suggestion list.
    ///
    /// Returns the stored new name. Renaming to the same name is a no-op.
    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<String, CategoryEditError> {
        if !self.contains(old) {
            return Err(CategoryEditError::UnknownCategory(old.to_string()));
        }
        let new = clean_name(new)?;
        if new == old {
            return Ok(new);
        }
        if self.contains(&new) {
            return Err(CategoryEditError::AlreadyExists(new));
        }

        let lists = std::iter::once(&mut self.categories).chain(self.by_meal.values_mut());
        for list in lists {
            for entry in list.iter_mut().filter(|entry| entry.as_str() == old) {
                *entry = new.clone();
            }
        }
        Ok(new)
    }

    /// Removes a category from the vocabulary and every suggestion list.
    pub fn remove_category(&mut self, name: &str) -> Result<(), CategoryEditError> {
        if !self.contains(name) {
            return Err(CategoryEditError::UnknownCategory(name.to_string()));
        }
        self.categories.retain(|entry| entry != name);
        for list in self.by_meal.values_mut() {
            list.retain(|entry| entry != name);
        }
        Ok(())
    }

    /// Appends `name` to a meal's suggestions. Returns `false` when present.
    pub fn add_suggestion(&mut self, meal: MealKey, name: &str) -> Result<bool, CategoryEditError> {
        let name = name.trim();
        if !self.contains(name) {
            return Err(CategoryEditError::UnknownCategory(name.to_string()));
        }
        let list = self.by_meal.entry(meal).or_default();
        if list.iter().any(|entry| entry == name) {
            return Ok(false);
        }
        list.push(name.to_string());
        Ok(true)
    }

    /// Removes `name` from a meal's suggestions. Returns whether it was there.
    pub fn remove_suggestion(&mut self, meal: MealKey, name: &str) -> bool {
        let list = self.by_meal.entry(meal).or_default();
        let before = list.len();
        list.retain(|entry| entry != name);
        list.len() != before
    }

    /// Moves the suggestion at `index` by `delta` positions.
    ///
    /// Returns `false` when either position falls outside the list.
    pub fn move_suggestion(&mut self, meal: MealKey, index: usize, delta: isize) -> bool {
        let list = self.by_meal.entry(meal).or_default();
        let Some(target) = index.checked_add_signed(delta) else {
            return false;
        };
        if index >= list.len() || target >= list.len() {
            return false;
        }
        let item = list.remove(index);
        list.insert(target, item);
        true
    }
}

impl From<CategoryConfigRecord> for CategoryConfig {
    fn from(record: CategoryConfigRecord) -> Self {
        let mut by_meal = BTreeMap::new();
        for (key, names) in record.by_meal {
            match MealKey::parse(key.trim()) {
                Some(meal) => {
                    by_meal.entry(meal).or_insert_with(Vec::new).extend(names);
                }
                None => debug!("event=categories_heal module=model status=ok dropped_meal={key}"),
            }
        }
        Self::new(record.categories, by_meal)
    }
}

impl From<CategoryConfig> for CategoryConfigRecord {
    fn from(config: CategoryConfig) -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            categories: config.categories,
            by_meal: config
                .by_meal
                .into_iter()
                .map(|(meal, names)| (meal.as_str().to_string(), names))
                .collect(),
        }
    }
}

fn clean_name(name: &str) -> Result<String, CategoryEditError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CategoryEditError::EmptyName);
    }
    Ok(name.to_string())
}
