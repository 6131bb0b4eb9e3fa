//! Core data layer of the menu planner.
//! This crate is the single source of truth for persistence invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{CategoryConfig, CategoryEditError, MISC_CATEGORY};
pub use model::food::{generate_food_id, Food, FoodId};
pub use model::menu::{DayKey, DayMeals, DayMenu, MealKey, WeekMenu};
pub use model::validation::ValidationError;
pub use repo::menu_repo::{JsonMenuRepository, MenuRepository};
pub use repo::{RepoError, RepoResult};
pub use service::category_service::{
    remap_deleted_category, rename_category_everywhere, CategoryService, CategoryServiceError,
};
pub use service::food_service::FoodService;
pub use storage::{
    resolve_active_profile_root, Document, DocumentStore, Profiles, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
