//! Food database editing use-cases.
//!
//! # Responsibility
//! - Provide add/update/toggle/delete entry points over the food snapshot.
//!
//! # Invariants
//! - Each mutation is one read of `foods.json` and one whole-list save.
//! - Food order is preserved; new foods are appended.

use crate::model::food::{Food, FoodId};
use crate::repo::menu_repo::MenuRepository;
use crate::repo::{RepoError, RepoResult};

/// Use-case service wrapper for food editing.
pub struct FoodService<R: MenuRepository> {
    repo: R,
}

impl<R: MenuRepository> FoodService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// All foods, active and inactive, in stored order.
    pub fn list_foods(&self) -> RepoResult<Vec<Food>> {
        self.repo.list_foods()
    }

    pub fn get_food(&self, id: &str) -> RepoResult<Option<Food>> {
        Ok(self.repo.list_foods()?.into_iter().find(|food| food.id == id))
    }

    /// Appends a food. A duplicate id fails validation and writes nothing.
    pub fn add_food(&self, food: Food) -> RepoResult<FoodId> {
        let mut foods = self.repo.list_foods()?;
        let id = food.id.clone();
        foods.push(food);
        self.repo.save_foods(&foods)?;
        Ok(id)
    }

    /// Replaces the food with the same id, keeping its position.
    pub fn update_food(&self, food: Food) -> RepoResult<()> {
        let mut foods = self.repo.list_foods()?;
        let slot = foods
            .iter_mut()
            .find(|current| current.id == food.id)
            .ok_or_else(|| RepoError::FoodNotFound(food.id.clone()))?;
        *slot = food;
        self.repo.save_foods(&foods)
    }

    /// Flips the `active` flag. Returns the new state.
    pub fn toggle_active(&self, id: &str) -> RepoResult<bool> {
        let mut foods = self.repo.list_foods()?;
        let food = foods
            .iter_mut()
            .find(|current| current.id == id)
            .ok_or_else(|| RepoError::FoodNotFound(id.to_string()))?;
        food.active = !food.active;
        let active = food.active;
        self.repo.save_foods(&foods)?;
        Ok(active)
    }

    pub fn delete_food(&self, id: &str) -> RepoResult<()> {
        let mut foods = self.repo.list_foods()?;
        let before = foods.len();
        foods.retain(|food| food.id != id);
        if foods.len() == before {
            return Err(RepoError::FoodNotFound(id.to_string()));
        }
        self.repo.save_foods(&foods)
    }

    /// Active foods of one category, in stored order.
    pub fn active_foods_in(&self, category: &str) -> RepoResult<Vec<Food>> {
        Ok(self
            .repo
            .list_foods()?
            .into_iter()
            .filter(|food| food.active && food.category == category)
            .collect())
    }
}
