//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `menus_core` linkage and the active profile layout.
//! - Keep output deterministic `key=value` lines for quick sanity checks.

use log::info;
use menus_core::storage::ensure_data_root;
use menus_core::{
    default_log_level, init_logging, resolve_active_profile_root, JsonMenuRepository,
    MenuRepository,
};
use std::error::Error;
use std::process::ExitCode;

const LOG_DIR_NAME: &str = "logs";

fn main() -> ExitCode {
    println!("menus_core ping={}", menus_core::ping());
    println!("menus_core version={}", menus_core::core_version());

    match probe() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("menus probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn probe() -> Result<(), Box<dyn Error>> {
    let data_root = ensure_data_root()?;
    init_logging(default_log_level(), data_root.join(LOG_DIR_NAME))?;

    let profile_root = resolve_active_profile_root()?;
    let repo = JsonMenuRepository::open(&profile_root)?;
    let foods = repo.list_foods()?.len();
    let allergens = repo.list_allergens()?.len();
    let categories = repo.list_categories()?.len();

    info!("event=cli_probe module=cli status=ok foods={foods} allergens={allergens} categories={categories}");
    println!("data_root={}", data_root.display());
    println!("profile_root={}", profile_root.display());
    println!("foods={foods} allergens={allergens} categories={categories}");
    Ok(())
}
