use menus_core::storage::{
    resolve_data_root_from, Profiles, RootSources, ACTIVE_PROFILE_FILE, APP_DIR_NAME,
    DEFAULT_PROFILE,
};
use menus_core::{DocumentStore, JsonMenuRepository, MenuRepository, RepoError, StorageError};
use std::ffi::OsString;
use std::fs;

#[test]
fn override_wins_over_cwd_and_home() {
    let cwd = tempfile::tempdir().unwrap();
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    fs::create_dir(cwd.path().join(APP_DIR_NAME)).unwrap();

    let sources = RootSources {
        env_override: Some(OsString::from(data.path())),
        cwd: Some(cwd.path().to_path_buf()),
        home: Some(home.path().to_path_buf()),
    };
    assert_eq!(resolve_data_root_from(&sources).unwrap(), data.path());
}

#[test]
fn existing_cwd_folder_wins_over_home() {
    let cwd = tempfile::tempdir().unwrap();
    let home = tempfile::tempdir().unwrap();
    let sources = RootSources {
        env_override: None,
        cwd: Some(cwd.path().to_path_buf()),
        home: Some(home.path().to_path_buf()),
    };

    assert_eq!(
        resolve_data_root_from(&sources).unwrap(),
        home.path().join(APP_DIR_NAME)
    );
    assert!(!home.path().join(APP_DIR_NAME).exists());

    fs::create_dir(cwd.path().join(APP_DIR_NAME)).unwrap();
    assert_eq!(
        resolve_data_root_from(&sources).unwrap(),
        cwd.path().join(APP_DIR_NAME)
    );
}

#[test]
fn relative_override_is_rejected() {
    let sources = RootSources {
        env_override: Some(OsString::from("relative/data")),
        cwd: None,
        home: None,
    };
    assert!(matches!(
        resolve_data_root_from(&sources).unwrap_err(),
        StorageError::InvalidRoot { .. }
    ));

    let nothing = RootSources::default();
    assert!(matches!(
        resolve_data_root_from(&nothing).unwrap_err(),
        StorageError::InvalidRoot { .. }
    ));
}

#[test]
fn first_active_lookup_selects_default_profile() {
    let data = tempfile::tempdir().unwrap();
    let profiles = Profiles::new(data.path());

    assert_eq!(profiles.active().unwrap(), DEFAULT_PROFILE);
    let root = profiles.active_root().unwrap();
    assert_eq!(root, data.path().join("profiles").join(DEFAULT_PROFILE));
    assert!(root.join("backups").is_dir());
    assert!(data.path().join("backups").is_dir());
    assert!(data.path().join("profiles").join("backups").is_dir());
    assert_eq!(
        fs::read_to_string(data.path().join("profiles").join(ACTIVE_PROFILE_FILE)).unwrap(),
        DEFAULT_PROFILE
    );
}

#[test]
fn switching_profiles_only_moves_the_pointer() {
    let data = tempfile::tempdir().unwrap();
    let profiles = Profiles::new(data.path());

    let home_root = profiles.active_root().unwrap();
    let home_repo = JsonMenuRepository::open(&home_root).unwrap();
    home_repo.save_allergens(&["Gluten".to_string()]).unwrap();

    let work_root = profiles.select("Work 2024").unwrap();
    assert_eq!(profiles.active().unwrap(), "Work 2024");
    assert_eq!(profiles.active_root().unwrap(), work_root);
    let work_repo = JsonMenuRepository::open(&work_root).unwrap();
    assert!(work_repo.list_allergens().unwrap().is_empty());

    profiles.select(DEFAULT_PROFILE).unwrap();
    assert_eq!(home_repo.list_allergens().unwrap(), vec!["Gluten"]);
    assert_eq!(profiles.list().unwrap(), vec!["Work 2024", DEFAULT_PROFILE]);
}

#[test]
fn invalid_profile_names_are_rejected() {
    let data = tempfile::tempdir().unwrap();
    let profiles = Profiles::new(data.path());

    for name in ["", "../escape", "backups", " padded", ".hidden"] {
        assert!(
            matches!(
                profiles.select(name).unwrap_err(),
                StorageError::InvalidName { .. }
            ),
            "{name:?} should be rejected"
        );
    }
    assert!(profiles.list().unwrap().is_empty());

    fs::create_dir_all(data.path().join("profiles")).unwrap();
    fs::write(
        data.path().join("profiles").join(ACTIVE_PROFILE_FILE),
        "../elsewhere",
    )
    .unwrap();
    assert!(matches!(
        profiles.active().unwrap_err(),
        StorageError::InvalidName { .. }
    ));
}

#[test]
fn store_rejects_path_escaping_names() {
    let data = tempfile::tempdir().unwrap();
    let store = DocumentStore::open(data.path()).unwrap();
    for name in ["../foods.json", "nested/foods.json", ".hidden.json", ""] {
        assert!(matches!(
            store.read(name).unwrap_err(),
            StorageError::InvalidName { .. }
        ));
    }
}

#[test]
fn directory_creation_failure_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "plain file").unwrap();

    assert!(matches!(
        DocumentStore::open(blocker.join("root")).unwrap_err(),
        StorageError::Io { .. }
    ));
    assert!(matches!(
        JsonMenuRepository::open(blocker.join("root")).unwrap_err(),
        RepoError::Storage(StorageError::Io { .. })
    ));
    assert!(matches!(
        Profiles::new(&blocker).active_root().unwrap_err(),
        StorageError::Io { .. }
    ));
}
