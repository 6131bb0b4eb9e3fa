use chrono::NaiveDate;
use menus_core::{
    DayKey, DayMeals, DayMenu, JsonMenuRepository, MealKey, MenuRepository, RepoError,
    ValidationError, WeekMenu,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn full_week(except: &[&str]) -> BTreeMap<String, DayMeals> {
    DayKey::ALL
        .into_iter()
        .filter(|day| !except.contains(&day.as_str()))
        .map(|day| (day.as_str().to_string(), DayMeals::default()))
        .collect()
}

#[test]
fn day_menu_round_trips_with_dangling_and_repeated_ids() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonMenuRepository::open(dir.path()).unwrap();

    let mut meals = DayMeals::default();
    meals.breakfast = vec!["f1".to_string(), "f1".to_string()];
    meals.dinner = vec!["deleted_food".to_string()];
    let menu = DayMenu::new(date(2024, 3, 14), meals);

    repo.save_day_menu(&menu, "thursday-plan").unwrap();
    let loaded = repo.load_day_menu("thursday-plan").unwrap();
    assert_eq!(loaded, menu);
    assert_eq!(loaded.meals.food_ids().count(), 3);
    assert!(loaded.meals.slot(MealKey::Lunch).is_empty());
    assert!(dir.path().join("thursday-plan.day.menu.json").is_file());
}

#[test]
fn day_menu_missing_slots_default_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("short.day.menu.json"),
        json!({"date": "2024-03-14", "meals": {"lunch": ["f9"]}}).to_string(),
    )
    .unwrap();
    let repo = JsonMenuRepository::open(dir.path()).unwrap();

    let menu = repo.load_day_menu("short").unwrap();
    assert_eq!(menu.meals.lunch, vec!["f9".to_string()]);
    assert!(menu.meals.breakfast.is_empty());
}

#[test]
fn week_menu_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonMenuRepository::open(dir.path()).unwrap();

    let mut week = WeekMenu::empty(date(2024, 1, 1)).unwrap();
    week.day_mut(DayKey::Wednesday)
        .slot_mut(MealKey::Lunch)
        .push("f2".to_string());
    week.day_mut(DayKey::Sunday)
        .slot_mut(MealKey::Snack)
        .push("f3".to_string());

    repo.save_week_menu(&week, "week-01").unwrap();
    let loaded = repo.load_week_menu("week-01").unwrap();
    assert_eq!(loaded, week);
    assert_eq!(loaded.day(DayKey::Wednesday).lunch, vec!["f2".to_string()]);
    assert_eq!(loaded.date_of(DayKey::Sunday), Some(date(2024, 1, 7)));
    assert!(loaded.day(DayKey::Monday).is_empty());

    let on_disk: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("week-01.week.menu.json")).unwrap())
            .unwrap();
    assert_eq!(on_disk["week_start"], "2024-01-01");
    assert_eq!(on_disk["days"].as_object().unwrap().len(), 7);
}

#[test]
fn week_start_must_be_monday() {
    let err = WeekMenu::new(date(2024, 1, 2), full_week(&[])).unwrap_err();
    assert_eq!(err, ValidationError::WeekStartNotMonday(date(2024, 1, 2)));
    assert!(WeekMenu::empty(date(2024, 1, 7)).is_err());
}

#[test]
fn week_with_a_missing_day_names_it() {
    let err = WeekMenu::new(date(2024, 1, 1), full_week(&["sunday"])).unwrap_err();
    assert_eq!(err, ValidationError::MissingDays(vec!["sunday".to_string()]));
}

#[test]
fn week_with_an_unknown_day_is_rejected() {
    let mut days = full_week(&[]);
    days.insert("funday".to_string(), DayMeals::default());
    let err = WeekMenu::new(date(2024, 1, 1), days).unwrap_err();
    assert_eq!(err, ValidationError::UnknownDay("funday".to_string()));
}

#[test]
fn loading_an_invalid_week_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let days: serde_json::Map<String, serde_json::Value> = full_week(&["sunday"])
        .into_keys()
        .map(|day| (day, json!({})))
        .collect();
    fs::write(
        dir.path().join("short.week.menu.json"),
        json!({"week_start": "2024-01-01", "days": days}).to_string(),
    )
    .unwrap();
    fs::write(
        dir.path().join("tuesday.week.menu.json"),
        json!({"week_start": "2024-01-02", "days": {}}).to_string(),
    )
    .unwrap();
    let repo = JsonMenuRepository::open(dir.path()).unwrap();

    assert!(matches!(
        repo.load_week_menu("short").unwrap_err(),
        RepoError::Validation(ValidationError::MissingDays(ref days)) if days == &["sunday"]
    ));
    assert!(matches!(
        repo.load_week_menu("tuesday").unwrap_err(),
        RepoError::Validation(ValidationError::WeekStartNotMonday(_))
    ));
}

#[test]
fn missing_menus_are_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonMenuRepository::open(dir.path()).unwrap();

    assert!(matches!(
        repo.load_day_menu("nope").unwrap_err(),
        RepoError::MenuNotFound(ref name) if name == "nope.day.menu.json"
    ));
    assert!(matches!(
        repo.load_week_menu("nope").unwrap_err(),
        RepoError::MenuNotFound(_)
    ));
}

#[test]
fn menus_are_listed_by_kind_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonMenuRepository::open(dir.path()).unwrap();
    let menu = DayMenu::new(date(2024, 3, 14), DayMeals::default());
    let week = WeekMenu::empty(date(2024, 1, 1)).unwrap();

    repo.save_day_menu(&menu, "b").unwrap();
    repo.save_day_menu(&menu, "a").unwrap();
    repo.save_week_menu(&week, "w").unwrap();
    repo.save_foods(&[]).unwrap();

    assert_eq!(repo.list_day_menus().unwrap(), vec!["a", "b"]);
    assert_eq!(repo.list_week_menus().unwrap(), vec!["w"]);
}

#[test]
fn saving_a_menu_twice_keeps_the_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonMenuRepository::open(dir.path()).unwrap();
    let first = DayMenu::new(date(2024, 3, 14), DayMeals::default());
    let mut second = first.clone();
    second.meals.lunch.push("f1".to_string());

    repo.save_day_menu(&first, "today").unwrap();
    repo.save_day_menu(&second, "today").unwrap();

    assert_eq!(repo.load_day_menu("today").unwrap(), second);
    let backup: DayMenu = serde_json::from_slice(
        &fs::read(dir.path().join("backups").join("today.day.menu.bak.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(backup, first);
}

#[test]
fn unknown_meal_slot_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("brunch.day.menu.json"),
        json!({"date": "2024-03-14", "meals": {"brunch": ["f1"]}}).to_string(),
    )
    .unwrap();
    let mut days: serde_json::Map<String, serde_json::Value> = full_week(&[])
        .into_keys()
        .map(|day| (day, json!({})))
        .collect();
    days.insert("friday".to_string(), json!({"brunch": ["f1"]}));
    fs::write(
        dir.path().join("brunch.week.menu.json"),
        json!({"week_start": "2024-01-01", "days": days}).to_string(),
    )
    .unwrap();
    let repo = JsonMenuRepository::open(dir.path()).unwrap();

    assert!(matches!(
        repo.load_day_menu("brunch").unwrap_err(),
        RepoError::Validation(ValidationError::InvalidRecord { .. })
    ));
    assert!(matches!(
        repo.load_week_menu("brunch").unwrap_err(),
        RepoError::Validation(ValidationError::InvalidRecord { .. })
    ));
}
