//! Data root resolution and named profiles.
//!
//! # Responsibility
//! - Pick the directory that holds all application data.
//! - Maintain `profiles/<name>/` folders and the `profiles/active.txt`
//!   pointer naming the selected profile.
//!
//! # Invariants
//! - Resolution order: `MENUSAPP_DATA_DIR`, then `./MenusApp` when it already
//!   exists, then `~/MenusApp`.
//! - Switching profiles only rewrites the pointer file; data is never moved.
//! - Every returned root has an existing `backups/` directory.

use super::document::{replace_file_atomically, BACKUP_DIR_NAME};
use super::{validate_profile_name, StorageError, StorageResult};
use log::{error, info};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Application folder name used for the cwd and home candidates.
pub const APP_DIR_NAME: &str = "MenusApp";
/// Environment variable holding an absolute data root override.
pub const DATA_DIR_ENV: &str = "MENUSAPP_DATA_DIR";
/// Folder under the data root holding one folder per profile.
pub const PROFILES_DIR_NAME: &str = "profiles";
/// Pointer file (inside `profiles/`) naming the active profile.
pub const ACTIVE_PROFILE_FILE: &str = "active.txt";
/// Profile selected when none has been chosen yet.
pub const DEFAULT_PROFILE: &str = "default";

/// Inputs of data root resolution.
///
/// Kept explicit so resolution can be exercised without touching process
/// environment.
#[derive(Debug, Clone, Default)]
pub struct RootSources {
    /// Value of `MENUSAPP_DATA_DIR`, if set and non-empty.
    pub env_override: Option<OsString>,
    /// Current working directory.
    pub cwd: Option<PathBuf>,
    /// User home directory.
    pub home: Option<PathBuf>,
}

impl RootSources {
    /// Captures the sources from the running process.
    pub fn from_env() -> Self {
        Self {
            env_override: std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()),
            cwd: std::env::current_dir().ok(),
            home: dirs::home_dir(),
        }
    }
}

/// Resolves the data root from explicit sources. Performs no writes.
///
/// # Errors
/// - `StorageError::InvalidRoot` when the override is relative or no home
///   directory is known.
pub fn resolve_data_root_from(sources: &RootSources) -> StorageResult<PathBuf> {
    if let Some(value) = &sources.env_override {
        let path = PathBuf::from(value);
        if !path.is_absolute() {
            return Err(StorageError::InvalidRoot {
                path,
                reason: format!("{DATA_DIR_ENV} must name an absolute directory"),
            });
        }
        return Ok(path);
    }

    if let Some(cwd) = &sources.cwd {
        let candidate = cwd.join(APP_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }

    match &sources.home {
        Some(home) => Ok(home.join(APP_DIR_NAME)),
        None => Err(StorageError::InvalidRoot {
            path: PathBuf::from(APP_DIR_NAME),
            reason: "no home directory available".to_string(),
        }),
    }
}

/// Resolves the data root for the running process. Performs no writes.
pub fn resolve_data_root() -> StorageResult<PathBuf> {
    resolve_data_root_from(&RootSources::from_env())
}

/// Resolves the data root and guarantees `<root>/backups` exists.
pub fn ensure_data_root() -> StorageResult<PathBuf> {
    let root = resolve_data_root()?;
    create_dir_all(&root.join(BACKUP_DIR_NAME))?;
    Ok(root)
}

/// Returns the active profile directory, creating the profile layout.
///
/// # Side effects
/// - Creates `profiles/`, `profiles/backups/`, the active profile folder and
///   its `backups/` folder when missing.
/// - Selects `default` when no profile was ever selected.
pub fn resolve_active_profile_root() -> StorageResult<PathBuf> {
    let root = ensure_data_root()?;
    Profiles::new(root).active_root()
}

/// Named profiles living under `<data_root>/profiles`.
#[derive(Debug, Clone)]
pub struct Profiles {
    data_root: PathBuf,
}

impl Profiles {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.data_root.join(PROFILES_DIR_NAME)
    }

    /// Directory of the named profile. Does not create it.
    pub fn root_of(&self, name: &str) -> StorageResult<PathBuf> {
        validate_profile_name(name)?;
        Ok(self.profiles_dir().join(name))
    }

    /// Name of the active profile, selecting `default` on first use.
    ///
    /// # Errors
    /// - `StorageError::InvalidName` when the pointer names an invalid
    ///   profile; the pointer is left as is for manual repair.
    pub fn active(&self) -> StorageResult<String> {
        self.ensure_layout()?;
        let pointer = self.pointer_path();
        let recorded = match fs::read_to_string(&pointer) {
            Ok(text) => text.trim().to_string(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(StorageError::io(&pointer, err)),
        };

        if recorded.is_empty() {
            self.select(DEFAULT_PROFILE)?;
            return Ok(DEFAULT_PROFILE.to_string());
        }

        validate_profile_name(&recorded)?;
        Ok(recorded)
    }

    /// Makes `name` the active profile and returns its directory.
    ///
    /// Creates the profile folder layout when missing. Existing data of any
    /// profile is left untouched.
    pub fn select(&self, name: &str) -> StorageResult<PathBuf> {
        let profile_root = self.ensure_profile(name)?;
        let pointer = self.pointer_path();
        replace_file_atomically(&pointer, |file| file.write_all(name.as_bytes())).map_err(
            |err| {
                error!("event=profile_select module=storage status=error profile={name} error={err}");
                StorageError::write(&pointer, err)
            },
        )?;
        info!("event=profile_select module=storage status=ok profile={name}");
        Ok(profile_root)
    }

    /// Sorted names of existing profile folders.
    pub fn list(&self) -> StorageResult<Vec<String>> {
        let dir = self.profiles_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io(&dir, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StorageError::io(&dir, err))?;
            let is_dir = entry
                .file_type()
                .map_err(|err| StorageError::io(entry.path(), err))?
                .is_dir();
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_profile_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Directory of the active profile with its layout guaranteed.
    pub fn active_root(&self) -> StorageResult<PathBuf> {
        let name = self.active()?;
        self.ensure_profile(&name)
    }

    fn ensure_profile(&self, name: &str) -> StorageResult<PathBuf> {
        let profile_root = self.root_of(name)?;
        self.ensure_layout()?;
        create_dir_all(&profile_root.join(BACKUP_DIR_NAME))?;
        Ok(profile_root)
    }

    fn ensure_layout(&self) -> StorageResult<()> {
        create_dir_all(&self.data_root.join(BACKUP_DIR_NAME))?;
        create_dir_all(&self.profiles_dir().join(BACKUP_DIR_NAME))
    }

    fn pointer_path(&self) -> PathBuf {
        self.profiles_dir().join(ACTIVE_PROFILE_FILE)
    }
}

fn create_dir_all(path: &Path) -> StorageResult<()> {
    fs::create_dir_all(path).map_err(|err| {
        error!(
            "event=dir_create module=storage status=error path={} error={}",
            path.display(),
            err
        );
        StorageError::io(path, err)
    })
}
