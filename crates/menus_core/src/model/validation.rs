//! Validation errors and text normalization shared by model types.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A data-model invariant violated by a loaded or about-to-be-saved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyFoodId,
    EmptyFoodName { id: String },
    EmptyCategory { id: String },
    /// Text field stored with leading/trailing whitespace.
    UntrimmedField { id: String, field: &'static str },
    /// `allergens` or `labels` contains an empty entry.
    EmptyTag { id: String, field: &'static str },
    DuplicateFoodId(String),
    WeekStartNotMonday(NaiveDate),
    /// Canonical day keys absent from a week menu, in week order.
    MissingDays(Vec<String>),
    UnknownDay(String),
    /// A persisted record does not have the expected shape.
    InvalidRecord { context: String, reason: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFoodId => write!(f, "food id cannot be empty"),
            Self::EmptyFoodName { id } => write!(f, "food `{id}` has an empty name"),
            Self::EmptyCategory { id } => write!(f, "food `{id}` has an empty category"),
            Self::UntrimmedField { id, field } => {
                write!(f, "food `{id}` has surrounding whitespace in `{field}`")
            }
            Self::EmptyTag { id, field } => write!(f, "food `{id}` has an empty entry in `{field}`"),
            Self::DuplicateFoodId(id) => write!(f, "duplicate food id `{id}`"),
            Self::WeekStartNotMonday(date) => write!(
                f,
                "week_start must be a monday, got {date} ({})",
                date.format("%A")
            ),
            Self::MissingDays(days) => write!(f, "week menu days missing: {}", days.join(", ")),
            Self::UnknownDay(day) => write!(f, "unknown week day key `{day}`"),
            Self::InvalidRecord { context, reason } => {
                write!(f, "invalid record in {context}: {reason}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims tag-like values and drops the ones left empty.
pub(crate) fn normalize_tags(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Removes duplicates, keeping the first occurrence of each value.
pub fn dedup_preserving_order<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
