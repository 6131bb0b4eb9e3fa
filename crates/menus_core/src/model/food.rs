//! Food domain model.
//!
//! # Responsibility
//! - Define the food record edited by the database editor.
//! - Normalize and validate text fields explicitly.
//!
//! # Invariants
//! - `id` is stable and never reassigned once a food is persisted.
//! - `name` and `category` are non-empty and stored trimmed.
//! - `allergens` and `labels` never hold empty entries.
//! - `category` is a plain string key; the vocabulary is dynamic.

use super::validation::{normalize_tags, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable opaque identifier of a food.
pub type FoodId = String;

const FOOD_ID_PREFIX: &str = "food_";
const FOOD_ID_HEX_LEN: usize = 8;

/// A food available to the menu planners.
///
/// Deserialization normalizes and validates, so a decoded `Food` always
/// satisfies the model invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FoodRecord")]
pub struct Food {
    pub id: FoodId,
    pub name: String,
    pub category: String,
    pub allergens: Vec<String>,
    pub labels: Vec<String>,
    pub notes: Option<String>,
    pub active: bool,
}

/// Wire shape of a food before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Food {
    /// Creates an active food with a freshly generated id.
    ///
    /// # Errors
    /// - `EmptyFoodName`/`EmptyCategory` when the trimmed text is empty.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::with_id(generate_food_id(), name, category)
    }

    /// Creates an active food with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(
        id: impl Into<FoodId>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let mut food = Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            allergens: Vec::new(),
            labels: Vec::new(),
            notes: None,
            active: true,
        };
        food.normalize();
        food.validate()?;
        Ok(food)
    }

    /// Trims text fields and drops blank allergen/label entries.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.allergens = normalize_tags(std::mem::take(&mut self.allergens));
        self.labels = normalize_tags(std::mem::take(&mut self.labels));
    }

    /// Checks the record invariants without modifying it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyFoodId);
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyFoodName {
                id: self.id.clone(),
            });
        }
        if self.category.is_empty() {
            return Err(ValidationError::EmptyCategory {
                id: self.id.clone(),
            });
        }
        if self.name.trim() != self.name {
            return Err(self.untrimmed("name"));
        }
        if self.category.trim() != self.category {
            return Err(self.untrimmed("category"));
        }
        for (field, values) in [("allergens", &self.allergens), ("labels", &self.labels)] {
            for value in values {
                if value.trim().is_empty() {
                    return Err(ValidationError::EmptyTag {
                        id: self.id.clone(),
                        field,
                    });
                }
                if value.trim() != value {
                    return Err(self.untrimmed(field));
                }
            }
        }
        Ok(())
    }

    /// Returns whether the food carries the allergen (exact text match).
    pub fn has_allergen(&self, allergen: &str) -> bool {
        self.allergens.iter().any(|value| value == allergen)
    }

    fn untrimmed(&self, field: &'static str) -> ValidationError {
        ValidationError::UntrimmedField {
            id: self.id.clone(),
            field,
        }
    }
}

impl TryFrom<FoodRecord> for Food {
    type Error = ValidationError;

    fn try_from(record: FoodRecord) -> Result<Self, Self::Error> {
        let mut food = Self {
            id: record.id,
            name: record.name,
            category: record.category,
            allergens: record.allergens,
            labels: record.labels,
            notes: record.notes,
            active: record.active,
        };
        food.normalize();
        food.validate()?;
        Ok(food)
    }
}

/// Validates every food and the uniqueness of ids across the collection.
pub fn validate_foods(foods: &[Food]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(foods.len());
    for food in foods {
        food.validate()?;
        if !seen.insert(food.id.as_str()) {
            return Err(ValidationError::DuplicateFoodId(food.id.clone()));
        }
    }
    Ok(())
}

/// Generates a new `food_xxxxxxxx` id from a random UUID.
pub fn generate_food_id() -> FoodId {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{FOOD_ID_PREFIX}{}", &hex[..FOOD_ID_HEX_LEN])
}
