//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate read-modify-write sequences over repository snapshots.
//! - Keep category references in foods consistent with the vocabulary.
//!
//! # Invariants
//! - Every mutation loads the full collection and saves it at most once.
//! - Services never bypass repository validation.

pub mod category_service;
pub mod food_service;
