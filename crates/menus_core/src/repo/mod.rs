//! Repository layer abstractions and JSON document implementations.
//!
//! # Responsibility
//! - Define typed, collection-oriented data access contracts.
//! - Keep document names and JSON shapes inside the persistence boundary.
//!
//! # Invariants
//! - Every save writes the whole collection (snapshot replace, no merge).
//! - Every list validates all elements and fails as a whole on the first
//!   invalid one; partial collections are never returned.
//! - Save paths validate before any byte reaches the disk.

use crate::model::food::FoodId;
use crate::model::validation::ValidationError;
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod menu_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for collection reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Validation(ValidationError),
    FoodNotFound(FoodId),
    MenuNotFound(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::FoodNotFound(id) => write!(f, "food not found: {id}"),
            Self::MenuNotFound(name) => write!(f, "menu not found: {name}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::FoodNotFound(_) | Self::MenuNotFound(_) => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
