//! Category editing and category/food consistency.
//!
//! # Responsibility
//! - Apply vocabulary and suggestion edits to the persisted config.
//! - Cascade renames and deletions into food `category` references.
//!
//! # Invariants
//! - Food cascades persist the food collection exactly once, and only when
//!   at least one food changed.
//! - Foods are never remapped to a category absent from the vocabulary.
//! - The config is saved before the food cascade runs, so a failed cascade
//!   leaves the vocabulary edit applied and the foods untouched.

use crate::model::category::{CategoryConfig, CategoryEditError};
use crate::model::menu::MealKey;
use crate::repo::menu_repo::MenuRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for category editing use-cases.
#[derive(Debug)]
pub enum CategoryServiceError {
    Edit(CategoryEditError),
    Repo(RepoError),
}

impl Display for CategoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Edit(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<CategoryEditError> for CategoryServiceError {
    fn from(value: CategoryEditError) -> Self {
        Self::Edit(value)
    }
}

impl From<RepoError> for CategoryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type CategoryServiceResult<T> = Result<T, CategoryServiceError>;

/// Reassigns every food in category `old` to `new`.
///
/// `new` is stored trimmed. Returns the number of foods changed. Calling it
/// again with the same `old` changes nothing.
pub fn rename_category_everywhere<R>(repo: &R, old: &str, new: &str) -> RepoResult<usize>
where
    R: MenuRepository + ?Sized,
{
    let new = new.trim();
    if old == new {
        return Ok(0);
    }
    let changed = reassign_category(repo, old, new)?;
    info!("event=category_rename module=service status=ok foods_changed={changed}");
    Ok(changed)
}

/// Moves foods of a deleted category to `fallback`.
///
/// Returns 0 without touching foods when `fallback` is not part of the
/// current vocabulary.
pub fn remap_deleted_category<R>(repo: &R, deleted: &str, fallback: &str) -> RepoResult<usize>
where
    R: MenuRepository + ?Sized,
{
    let fallback = fallback.trim();
    let vocabulary = repo.list_categories()?;
    if !vocabulary.iter().any(|name| name == fallback) {
        info!("event=category_remap module=service status=noop reason=unknown_fallback");
        return Ok(0);
    }
    let changed = reassign_category(repo, deleted, fallback)?;
    info!("event=category_remap module=service status=ok foods_changed={changed}");
    Ok(changed)
}

fn reassign_category<R>(repo: &R, from: &str, to: &str) -> RepoResult<usize>
where
    R: MenuRepository + ?Sized,
{
    let mut foods = repo.list_foods()?;
    let mut changed = 0;
    for food in foods.iter_mut().filter(|food| food.category == from) {
        food.category = to.to_string();
        changed += 1;
    }
    if changed > 0 {
        repo.save_foods(&foods)?;
    }
    Ok(changed)
}

/// Use-case service behind the category editor.
pub struct CategoryService<R: MenuRepository> {
    repo: R,
}

impl<R: MenuRepository> CategoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Loads the current (self-healed) config.
    pub fn load_config(&self) -> CategoryServiceResult<CategoryConfig> {
        Ok(self.repo.load_categories_config()?)
    }

    /// Adds a category to the vocabulary. Returns the stored name.
    pub fn add_category(&self, name: &str) -> CategoryServiceResult<String> {
        let mut config = self.repo.load_categories_config()?;
        let stored = config.add_category(name)?;
        self.repo.save_categories_config(&config)?;
        Ok(stored)
    }

    /// Renames a category in the config and in every food using it.
    ///
    /// Returns the number of foods changed.
    pub fn rename_category(&self, old: &str, new: &str) -> CategoryServiceResult<usize> {
        let mut config = self.repo.load_categories_config()?;
        let stored = config.rename_category(old, new)?;
        if stored == old {
            return Ok(0);
        }
        self.repo.save_categories_config(&config)?;
        Ok(rename_category_everywhere(&self.repo, old, &stored)?)
    }

    /// Deletes a category and moves its foods to `fallback` when possible.
    ///
    /// Returns the number of foods moved.
    pub fn delete_category(&self, name: &str, fallback: &str) -> CategoryServiceResult<usize> {
        let mut config = self.repo.load_categories_config()?;
        config.remove_category(name)?;
        self.repo.save_categories_config(&config)?;
        Ok(remap_deleted_category(&self.repo, name, fallback)?)
    }

    pub fn add_suggestion(&self, meal: MealKey, name: &str) -> CategoryServiceResult<bool> {
        let mut config = self.repo.load_categories_config()?;
        let added = config.add_suggestion(meal, name)?;
        if added {
            self.repo.save_categories_config(&config)?;
        }
        Ok(added)
    }

    pub fn remove_suggestion(&self, meal: MealKey, name: &str) -> CategoryServiceResult<bool> {
        let mut config = self.repo.load_categories_config()?;
        let removed = config.remove_suggestion(meal, name);
        if removed {
            self.repo.save_categories_config(&config)?;
        }
        Ok(removed)
    }

    pub fn move_suggestion(
        &self,
        meal: MealKey,
        index: usize,
        delta: isize,
    ) -> CategoryServiceResult<bool> {
        let mut config = self.repo.load_categories_config()?;
        let moved = config.move_suggestion(meal, index, delta);
        if moved {
            self.repo.save_categories_config(&config)?;
        }
        Ok(moved)
    }

    pub fn rename_category_everywhere(&self, old: &str, new: &str) -> RepoResult<usize> {
        rename_category_everywhere(&self.repo, old, new)
    }

    pub fn remap_deleted_category(&self, deleted: &str, fallback: &str) -> RepoResult<usize> {
        remap_deleted_category(&self.repo, deleted, fallback)
    }
}
