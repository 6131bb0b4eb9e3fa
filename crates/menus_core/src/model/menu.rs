//! Day and week menu snapshots.
//!
//! # Responsibility
//! - Define the five meal slots of a day and the seven days of a week.
//! - Enforce week menu invariants at construction time.
//!
//! # Invariants
//! - Meal slots hold food ids, never embedded foods; duplicates are allowed.
//! - `WeekMenu::week_start` is a Monday.
//! - A `WeekMenu` always has all seven canonical day keys.

use super::food::FoodId;
use super::validation::ValidationError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// One of the five meal slots of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealKey {
    Breakfast,
    Midmorning,
    Lunch,
    Snack,
    Dinner,
}

impl MealKey {
    /// All slots in serving order.
    pub const ALL: [MealKey; 5] = [
        MealKey::Breakfast,
        MealKey::Midmorning,
        MealKey::Lunch,
        MealKey::Snack,
        MealKey::Dinner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Midmorning => "midmorning",
            Self::Lunch => "lunch",
            Self::Snack => "snack",
            Self::Dinner => "dinner",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

impl Display for MealKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the seven canonical day keys of a week menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayKey {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayKey {
    /// All days in week order, starting on Monday.
    pub const ALL: [DayKey; 7] = [
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
        DayKey::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }

    /// Zero-based offset from Monday.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Food ids planned for each meal slot of one day.
///
/// Unknown slot keys are rejected on decode so no reference is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayMeals {
    #[serde(default)]
    pub breakfast: Vec<FoodId>,
    #[serde(default)]
    pub midmorning: Vec<FoodId>,
    #[serde(default)]
    pub lunch: Vec<FoodId>,
    #[serde(default)]
    pub snack: Vec<FoodId>,
    #[serde(default)]
    pub dinner: Vec<FoodId>,
}

impl DayMeals {
    pub fn slot(&self, meal: MealKey) -> &[FoodId] {
        match meal {
            MealKey::Breakfast => &self.breakfast,
            MealKey::Midmorning => &self.midmorning,
            MealKey::Lunch => &self.lunch,
            MealKey::Snack => &self.snack,
            MealKey::Dinner => &self.dinner,
        }
    }

    pub fn slot_mut(&mut self, meal: MealKey) -> &mut Vec<FoodId> {
        match meal {
            MealKey::Breakfast => &mut self.breakfast,
            MealKey::Midmorning => &mut self.midmorning,
            MealKey::Lunch => &mut self.lunch,
            MealKey::Snack => &mut self.snack,
            MealKey::Dinner => &mut self.dinner,
        }
    }

    pub fn is_empty(&self) -> bool {
        MealKey::ALL.into_iter().all(|meal| self.slot(meal).is_empty())
    }

    /// Every referenced id in slot order, duplicates included.
    pub fn food_ids(&self) -> impl Iterator<Item = &FoodId> + '_ {
        MealKey::ALL
            .into_iter()
            .flat_map(move |meal| self.slot(meal).iter())
    }
}

/// Menu for a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMenu {
    pub date: NaiveDate,
    pub meals: DayMeals,
}

impl DayMenu {
    pub fn new(date: NaiveDate, meals: DayMeals) -> Self {
        Self { date, meals }
    }
}

/// Menu for a Monday-to-Sunday week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WeekMenuRecord", into = "WeekMenuRecord")]
pub struct WeekMenu {
    week_start: NaiveDate,
    days: [DayMeals; 7],
}

/// Wire shape of a week menu: day keys as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekMenuRecord {
    pub week_start: NaiveDate,
    pub days: BTreeMap<String, DayMeals>,
}

impl WeekMenu {
    /// Builds a week menu from string-keyed days.
    ///
    /// # Errors
    /// - `WeekStartNotMonday` when `week_start` is not a Monday.
    /// - `MissingDays` naming every absent canonical key.
    /// - `UnknownDay` for a key outside the seven canonical ones.
    pub fn new(
        week_start: NaiveDate,
        days: BTreeMap<String, DayMeals>,
    ) -> Result<Self, ValidationError> {
        ensure_monday(week_start)?;

        let missing: Vec<String> = DayKey::ALL
            .into_iter()
            .filter(|day| !days.contains_key(day.as_str()))
            .map(|day| day.as_str().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingDays(missing));
        }

        let mut slots: [DayMeals; 7] = Default::default();
        for (key, meals) in days {
            let day = DayKey::parse(&key).ok_or(ValidationError::UnknownDay(key))?;
            slots[day.index()] = meals;
        }

        Ok(Self {
            week_start,
            days: slots,
        })
    }

    /// Builds a week with seven empty days.
    pub fn empty(week_start: NaiveDate) -> Result<Self, ValidationError> {
        ensure_monday(week_start)?;
        Ok(Self {
            week_start,
            days: Default::default(),
        })
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn day(&self, day: DayKey) -> &DayMeals {
        &self.days[day.index()]
    }

    pub fn day_mut(&mut self, day: DayKey) -> &mut DayMeals {
        &mut self.days[day.index()]
    }

    /// Calendar date of `day` within this week.
    pub fn date_of(&self, day: DayKey) -> Option<NaiveDate> {
        self.week_start.checked_add_days(Days::new(day.index() as u64))
    }

    /// Days in week order.
    pub fn days(&self) -> impl Iterator<Item = (DayKey, &DayMeals)> + '_ {
        DayKey::ALL
            .into_iter()
            .map(move |day| (day, &self.days[day.index()]))
    }
}

impl TryFrom<WeekMenuRecord> for WeekMenu {
    type Error = ValidationError;

    fn try_from(record: WeekMenuRecord) -> Result<Self, Self::Error> {
        Self::new(record.week_start, record.days)
    }
}

impl From<WeekMenu> for WeekMenuRecord {
    fn from(menu: WeekMenu) -> Self {
        let days = DayKey::ALL
            .into_iter()
            .zip(menu.days)
            .map(|(day, meals)| (day.as_str().to_string(), meals))
            .collect();
        Self {
            week_start: menu.week_start,
            days,
        }
    }
}

fn ensure_monday(date: NaiveDate) -> Result<(), ValidationError> {
    if date.weekday() == Weekday::Mon {
        Ok(())
    } else {
        Err(ValidationError::WeekStartNotMonday(date))
    }
}
