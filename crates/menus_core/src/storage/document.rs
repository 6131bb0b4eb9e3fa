//! Atomic JSON document store.
//!
//! # Responsibility
//! - Map document names onto files inside one root directory.
//! - Read documents as JSON objects, defaulting missing files to an empty
//!   versioned document.
//! - Replace documents atomically, keeping the previous version in
//!   `backups/<stem>.bak.json`.
//!
//! # Invariants
//! - Temp files are created next to the destination so the final rename
//!   never crosses a filesystem boundary.
//! - A failed write leaves the destination bytes unchanged and removes the
//!   temp file.
//! - Only one backup slot exists per stem; each successful overwrite
//!   replaces it.

use super::{validate_document_name, StorageError, StorageResult};
use log::{debug, error, info};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Format version stamped into every versioned document.
pub const DOCUMENT_FORMAT_VERSION: u64 = 1;
/// Sub-directory holding single-slot backups.
pub const BACKUP_DIR_NAME: &str = "backups";

/// A persisted JSON object keyed by strings.
pub type Document = Map<String, Value>;

/// Reads and writes named JSON documents under a single root directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Opens a store rooted at `root`, creating `root/backups` when missing.
    ///
    /// # Errors
    /// - `StorageError::Io` when the directories cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        let backups = root.join(BACKUP_DIR_NAME);
        fs::create_dir_all(&backups).map_err(|err| {
            error!(
                "event=store_open module=storage status=error path={} error={}",
                backups.display(),
                err
            );
            StorageError::io(&backups, err)
        })?;
        Ok(Self { root })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the named document.
    pub fn path_of(&self, name: &str) -> StorageResult<PathBuf> {
        validate_document_name(name)?;
        Ok(self.root.join(name))
    }

    /// Full path of the backup slot for the named document.
    pub fn backup_path_of(&self, name: &str) -> StorageResult<PathBuf> {
        validate_document_name(name)?;
        Ok(self
            .root
            .join(BACKUP_DIR_NAME)
            .join(format!("{}.bak.json", file_stem(name))))
    }

    /// Returns whether the named document exists on disk.
    pub fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.path_of(name)?;
        path.try_exists().map_err(|err| StorageError::io(&path, err))
    }

    /// Reads the named document.
    ///
    /// A missing file yields `{"version": 1}`.
    ///
    /// # Errors
    /// - `StorageError::Io` when the file exists but cannot be read.
    /// - `StorageError::MalformedDocument` when the contents are not a JSON
    ///   object. The backup copy is never consulted automatically.
    pub fn read(&self, name: &str) -> StorageResult<Document> {
        let path = self.path_of(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("event=doc_read module=storage status=ok name={name} missing=true");
                return Ok(empty_document());
            }
            Err(err) => {
                error!("event=doc_read module=storage status=error name={name} error={err}");
                return Err(StorageError::io(&path, err));
            }
        };

        let value: Value = serde_json::from_slice(&bytes).map_err(|err| {
            error!(
                "event=doc_read module=storage status=error name={name} error_code=malformed_json"
            );
            StorageError::MalformedDocument {
                path: path.clone(),
                reason: err.to_string(),
            }
        })?;

        match value {
            Value::Object(document) => {
                debug!(
                    "event=doc_read module=storage status=ok name={name} bytes={}",
                    bytes.len()
                );
                Ok(document)
            }
            other => {
                error!(
                    "event=doc_read module=storage status=error name={name} error_code=not_an_object"
                );
                Err(StorageError::MalformedDocument {
                    path,
                    reason: format!("top-level value is {}, expected an object", kind_of(&other)),
                })
            }
        }
    }

    /// Replaces the named document atomically.
    ///
    /// # Side effects
    /// - Copies the current file (if any) to `backups/<stem>.bak.json`,
    ///   overwriting the previous backup.
    ///
    /// # Errors
    /// - `StorageError::Io` when the backup copy fails (nothing written).
    /// - `StorageError::Write` when the temp write or the rename fails.
    pub fn write(&self, name: &str, document: &Document) -> StorageResult<()> {
        self.write_with(name, |file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, document).map_err(io::Error::from)?;
            writer.write_all(b"\n")?;
            writer.flush()
        })
    }

    /// Lists document names ending with `suffix`, with the suffix removed.
    ///
    /// Names are returned sorted.
    pub fn list_names(&self, suffix: &str) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|err| StorageError::io(&self.root, err))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StorageError::io(&self.root, err))?;
            let is_file = entry
                .file_type()
                .map_err(|err| StorageError::io(entry.path(), err))?
                .is_file();
            if !is_file {
                continue;
            }
            if let Some(stem) = entry
                .file_name()
                .to_str()
                .and_then(|file_name| file_name.strip_suffix(suffix))
            {
                if !stem.is_empty() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn write_with<F>(&self, name: &str, fill: F) -> StorageResult<()>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let path = self.path_of(name)?;
        let started_at = Instant::now();

        if path.is_file() {
            self.backup(name, &path)?;
        }

        match replace_file_atomically(&path, fill) {
            Ok(()) => {
                info!(
                    "event=doc_write module=storage status=ok name={name} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=doc_write module=storage status=error name={name} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(StorageError::write(path, err))
            }
        }
    }

    fn backup(&self, name: &str, path: &Path) -> StorageResult<()> {
        let backup_path = self.backup_path_of(name)?;
        if let Some(dir) = backup_path.parent() {
            fs::create_dir_all(dir).map_err(|err| StorageError::io(dir, err))?;
        }
        fs::copy(path, &backup_path).map_err(|err| {
            error!(
                "event=doc_backup module=storage status=error name={name} error={err}"
            );
            StorageError::io(&backup_path, err)
        })?;
        debug!("event=doc_backup module=storage status=ok name={name}");
        Ok(())
    }
}

/// Writes a sibling temp file through `fill` and renames it onto `dest`.
///
/// The temp file is removed when `fill`, the sync or the rename fails.
pub(crate) fn replace_file_atomically<F>(dest: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = dest.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination has no parent directory",
        )
    })?;
    let prefix = format!(
        "{}_",
        dest.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    );

    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    fill(temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    temp.persist(dest).map_err(|err| err.error)?;
    Ok(())
}

fn empty_document() -> Document {
    let mut document = Document::new();
    document.insert("version".to_string(), Value::from(DOCUMENT_FORMAT_VERSION));
    document
}

fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, DocumentStore, DOCUMENT_FORMAT_VERSION};
    use crate::storage::StorageError;
    use serde_json::json;
    use std::fs;
    use std::io::{self, Write};

    fn document(value: serde_json::Value) -> Document {
        value.as_object().cloned().expect("fixture should be an object")
    }

    fn temp_files_in(dir: &std::path::Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn missing_document_reads_as_versioned_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let loaded = store.read("foods.json").unwrap();
        assert_eq!(loaded.get("version"), Some(&json!(DOCUMENT_FORMAT_VERSION)));
        assert_eq!(loaded.len(), 1);
        assert!(dir.path().join("backups").is_dir());
    }

    #[test]
    fn write_then_read_preserves_every_json_kind() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        let original = document(json!({
            "version": 1,
            "int": -42,
            "float": 2.5,
            "text": "Lácteos \"quoted\"",
            "flag": false,
            "nothing": null,
            "list": [1, "two", [3], {"four": 4}],
            "nested": {"deep": {"deeper": true}}
        }));

        store.write("rules.json", &original).unwrap();
        assert_eq!(store.read("rules.json").unwrap(), original);
    }

    #[test]
    fn non_object_top_level_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("allergens.json"), "[1, 2, 3]").unwrap();
        fs::write(dir.path().join("foods.json"), "{\"foods\": [").unwrap();

        let err = store.read("allergens.json").unwrap_err();
        assert!(matches!(err, StorageError::MalformedDocument { .. }));
        assert!(err.to_string().contains("an array"));

        let err = store.read("foods.json").unwrap_err();
        assert!(matches!(err, StorageError::MalformedDocument { .. }));
    }

    #[test]
    fn backup_keeps_only_the_immediately_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        let backup = store.backup_path_of("rules.json").unwrap();

        store.write("rules.json", &document(json!({"rev": 1}))).unwrap();
        assert!(!backup.exists());

        store.write("rules.json", &document(json!({"rev": 2}))).unwrap();
        store.write("rules.json", &document(json!({"rev": 3}))).unwrap();

        let saved: serde_json::Value =
            serde_json::from_slice(&fs::read(&backup).unwrap()).unwrap();
        assert_eq!(saved, json!({"rev": 2}));
        assert!(backup.ends_with("backups/rules.bak.json"));
    }

    #[test]
    fn interrupted_temp_write_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        store
            .write("foods.json", &document(json!({"version": 1, "foods": []})))
            .unwrap();
        let path = store.path_of("foods.json").unwrap();
        let before = fs::read(&path).unwrap();

        let err = store
            .write_with("foods.json", |file| {
                file.write_all(b"{\"version\": 1, \"fo")?;
                Err(io::Error::new(io::ErrorKind::Other, "injected failure"))
            })
            .unwrap_err();

        assert!(matches!(err, StorageError::Write { .. }));
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(temp_files_in(dir.path()).is_empty());
    }

    #[test]
    fn list_names_strips_suffix_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        let empty = document(json!({}));
        store.write("tuesday.day.menu.json", &empty).unwrap();
        store.write("monday.day.menu.json", &empty).unwrap();
        store.write("week1.week.menu.json", &empty).unwrap();

        assert_eq!(
            store.list_names(".day.menu.json").unwrap(),
            vec!["monday".to_string(), "tuesday".to_string()]
        );
        assert_eq!(
            store.list_names(".week.menu.json").unwrap(),
            vec!["week1".to_string()]
        );
    }

    #[test]
    fn invalid_names_never_touch_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let err = store
            .write("../escape.json", &document(json!({})))
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidName { .. }));
        assert!(!dir.path().parent().unwrap().join("escape.json").exists());
    }
}
