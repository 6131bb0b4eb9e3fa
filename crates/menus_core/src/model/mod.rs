//! Domain model for foods, menus and the category vocabulary.
//!
//! # Responsibility
//! - Define the canonical records persisted by the repository layer.
//! - Validate invariants explicitly at construction/decode boundaries.
//!
//! # Invariants
//! - Every food is identified by a stable opaque `FoodId`.
//! - Menus reference foods by id only; a dangling id is not an error.
//! - A `WeekMenu` always starts on a Monday and carries all seven days.

pub mod category;
pub mod food;
pub mod menu;
pub mod validation;
