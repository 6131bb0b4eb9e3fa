//! Menu data repository contracts and JSON document implementation.
//!
//! # Responsibility
//! - Provide list/save pairs for foods, allergens, rules and categories.
//! - Persist named day/week menu snapshots.
//! - Auto-initialize and self-heal the category configuration.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Category config is loaded fresh on every access; no cache.
//! - Menus are written as whole snapshots and never patched.

use super::{RepoError, RepoResult};
use crate::model::category::{CategoryConfig, CategoryConfigRecord, MISC_CATEGORY};
use crate::model::food::{validate_foods, Food, FoodRecord};
use crate::model::menu::{DayMenu, MealKey, WeekMenu, WeekMenuRecord};
use crate::model::validation::{dedup_preserving_order, normalize_tags, ValidationError};
use crate::storage::{resolve_active_profile_root, Document, DocumentStore, DOCUMENT_FORMAT_VERSION};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

pub const FOODS_DOCUMENT: &str = "foods.json";
pub const ALLERGENS_DOCUMENT: &str = "allergens.json";
pub const RULES_DOCUMENT: &str = "rules.json";
pub const CATEGORIES_DOCUMENT: &str = "categories.json";
pub const DAY_MENU_SUFFIX: &str = ".day.menu.json";
pub const WEEK_MENU_SUFFIX: &str = ".week.menu.json";

const FOODS_KEY: &str = "foods";
const ALLERGENS_KEY: &str = "allergens";

/// Repository interface used by editors, planners and exporters.
///
/// `list_categories` and `default_categories_for` are derived from the
/// other accessors and rarely need overriding.
pub trait MenuRepository {
    fn list_foods(&self) -> RepoResult<Vec<Food>>;
    fn save_foods(&self, foods: &[Food]) -> RepoResult<()>;

    fn list_allergens(&self) -> RepoResult<Vec<String>>;
    fn save_allergens(&self, allergens: &[String]) -> RepoResult<()>;

    fn load_rules(&self) -> RepoResult<Document>;
    fn save_rules(&self, rules: &Document) -> RepoResult<()>;

    fn save_day_menu(&self, menu: &DayMenu, name: &str) -> RepoResult<()>;
    fn load_day_menu(&self, name: &str) -> RepoResult<DayMenu>;
    fn list_day_menus(&self) -> RepoResult<Vec<String>>;

    fn save_week_menu(&self, menu: &WeekMenu, name: &str) -> RepoResult<()>;
    fn load_week_menu(&self, name: &str) -> RepoResult<WeekMenu>;
    fn list_week_menus(&self) -> RepoResult<Vec<String>>;

    fn load_categories_config(&self) -> RepoResult<CategoryConfig>;
    fn save_categories_config(&self, config: &CategoryConfig) -> RepoResult<()>;

    /// Global vocabulary, or the categories used by foods when it is empty.
    fn list_categories(&self) -> RepoResult<Vec<String>> {
        let config = self.load_categories_config()?;
        if !config.categories().is_empty() {
            return Ok(config.categories().to_vec());
        }
        let foods = self.list_foods()?;
        Ok(dedup_preserving_order(
            foods.into_iter().map(|food| food.category),
        ))
    }

    /// Suggested categories for a meal slot, with fallbacks when unset.
    fn default_categories_for(&self, meal: MealKey) -> RepoResult<Vec<String>> {
        let config = self.load_categories_config()?;
        let suggestions = config.suggestions(meal);
        if !suggestions.is_empty() {
            return Ok(suggestions.to_vec());
        }
        let categories = self.list_categories()?;
        if categories.iter().any(|name| name == MISC_CATEGORY) {
            Ok(vec![MISC_CATEGORY.to_string()])
        } else {
            Ok(categories)
        }
    }
}

/// Repository backed by JSON documents in one profile directory.
#[derive(Debug, Clone)]
pub struct JsonMenuRepository {
    store: DocumentStore,
}

impl JsonMenuRepository {
    /// Opens a repository rooted at `root`, creating `root/backups`.
    pub fn open(root: impl Into<PathBuf>) -> RepoResult<Self> {
        Ok(Self::from_store(DocumentStore::open(root)?))
    }

    /// Opens the repository of the active profile.
    pub fn open_active() -> RepoResult<Self> {
        Self::open(resolve_active_profile_root()?)
    }

    pub fn from_store(store: DocumentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    fn write_value<T: Serialize>(&self, name: &str, value: &T) -> RepoResult<()> {
        let document = match serde_json::to_value(value) {
            Ok(Value::Object(document)) => document,
            Ok(_) => {
                return Err(invalid_record(name, "value does not serialize to an object").into())
            }
            Err(err) => return Err(invalid_record(name, err).into()),
        };
        self.store.write(name, &document)?;
        Ok(())
    }

    fn read_value<T: DeserializeOwned>(&self, name: &str) -> RepoResult<T> {
        let document = self.store.read(name)?;
        decode(Value::Object(document), name)
    }

    fn read_menu<T: DeserializeOwned>(&self, name: &str) -> RepoResult<T> {
        if !self.store.exists(name)? {
            return Err(RepoError::MenuNotFound(name.to_string()));
        }
        self.read_value(name)
    }
}

impl MenuRepository for JsonMenuRepository {
    fn list_foods(&self) -> RepoResult<Vec<Food>> {
        let mut document = self.store.read(FOODS_DOCUMENT)?;
        let items = take_array(&mut document, FOODS_KEY, FOODS_DOCUMENT)?;
        let foods = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| -> RepoResult<Food> {
                let context = format!("{FOODS_DOCUMENT}[{index}]");
                let record: FoodRecord = decode(item, &context)?;
                Ok(Food::try_from(record)?)
            })
            .collect::<RepoResult<Vec<_>>>()?;
        validate_foods(&foods)?;
        Ok(foods)
    }

    fn save_foods(&self, foods: &[Food]) -> RepoResult<()> {
        validate_foods(foods)?;
        let mut document = versioned_document();
        document.insert(
            FOODS_KEY.to_string(),
            serde_json::to_value(foods).map_err(|err| invalid_record(FOODS_DOCUMENT, err))?,
        );
        self.store.write(FOODS_DOCUMENT, &document)?;
        info!(
            "event=foods_save module=repo status=ok count={}",
            foods.len()
        );
        Ok(())
    }

    fn list_allergens(&self) -> RepoResult<Vec<String>> {
        let mut document = self.store.read(ALLERGENS_DOCUMENT)?;
        let items = take_array(&mut document, ALLERGENS_KEY, ALLERGENS_DOCUMENT)?;
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| -> RepoResult<String> {
                match item {
                    Value::String(name) => Ok(name),
                    other => Err(invalid_record(
                        format!("{ALLERGENS_DOCUMENT}[{index}]"),
                        format!("expected a string, got {other}"),
                    )
                    .into()),
                }
            })
            .collect()
    }

    fn save_allergens(&self, allergens: &[String]) -> RepoResult<()> {
        let allergens = normalize_tags(allergens.to_vec());
        let mut document = versioned_document();
        document.insert(ALLERGENS_KEY.to_string(), Value::from(allergens));
        self.store.write(ALLERGENS_DOCUMENT, &document)?;
        Ok(())
    }

    fn load_rules(&self) -> RepoResult<Document> {
        Ok(self.store.read(RULES_DOCUMENT)?)
    }

    fn save_rules(&self, rules: &Document) -> RepoResult<()> {
        self.store.write(RULES_DOCUMENT, rules)?;
        Ok(())
    }

    fn save_day_menu(&self, menu: &DayMenu, name: &str) -> RepoResult<()> {
        self.write_value(&day_menu_document(name), menu)
    }

    fn load_day_menu(&self, name: &str) -> RepoResult<DayMenu> {
        self.read_menu(&day_menu_document(name))
    }

    fn list_day_menus(&self) -> RepoResult<Vec<String>> {
        Ok(self.store.list_names(DAY_MENU_SUFFIX)?)
    }

    fn save_week_menu(&self, menu: &WeekMenu, name: &str) -> RepoResult<()> {
        self.write_value(&week_menu_document(name), menu)
    }

    fn load_week_menu(&self, name: &str) -> RepoResult<WeekMenu> {
        let record: WeekMenuRecord = self.read_menu(&week_menu_document(name))?;
        Ok(WeekMenu::try_from(record)?)
    }

    fn list_week_menus(&self) -> RepoResult<Vec<String>> {
        Ok(self.store.list_names(WEEK_MENU_SUFFIX)?)
    }

    fn load_categories_config(&self) -> RepoResult<CategoryConfig> {
        if !self.store.exists(CATEGORIES_DOCUMENT)? {
            let defaults = CategoryConfig::defaults();
            self.save_categories_config(&defaults)?;
            info!("event=categories_init module=repo status=ok");
            return Ok(defaults);
        }
        let record: CategoryConfigRecord = self.read_value(CATEGORIES_DOCUMENT)?;
        Ok(CategoryConfig::from(record))
    }

    fn save_categories_config(&self, config: &CategoryConfig) -> RepoResult<()> {
        let mut healed = config.clone();
        healed.heal();
        self.write_value(CATEGORIES_DOCUMENT, &healed)
    }
}

/// File name of a named day menu snapshot.
pub fn day_menu_document(name: &str) -> String {
    format!("{name}{DAY_MENU_SUFFIX}")
}

/// File name of a named week menu snapshot.
pub fn week_menu_document(name: &str) -> String {
    format!("{name}{WEEK_MENU_SUFFIX}")
}

fn versioned_document() -> Document {
    let mut document = Document::new();
    document.insert("version".to_string(), Value::from(DOCUMENT_FORMAT_VERSION));
    document
}

fn take_array(document: &mut Document, key: &str, name: &str) -> RepoResult<Vec<Value>> {
    match document.remove(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(invalid_record(format!("{name}.{key}"), "expected an array").into()),
    }
}

fn decode<T: DeserializeOwned>(value: Value, context: &str) -> RepoResult<T> {
    serde_json::from_value(value).map_err(|err| invalid_record(context, err).into())
}

fn invalid_record(context: impl Into<String>, reason: impl ToString) -> ValidationError {
    ValidationError::InvalidRecord {
        context: context.into(),
        reason: reason.to_string(),
    }
}
