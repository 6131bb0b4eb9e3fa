//! File-backed storage bootstrap and atomic document persistence.
//!
//! # Responsibility
//! - Resolve the data root and the active profile directory.
//! - Read and write JSON documents with backup-before-overwrite semantics.
//!
//! # Invariants
//! - A destination document is never observed partially written.
//! - Every root handed to callers has an existing `backups/` directory.
//! - Core code must not touch documents outside the resolved root.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod document;
mod root;

pub use document::{Document, DocumentStore, BACKUP_DIR_NAME, DOCUMENT_FORMAT_VERSION};
pub use root::{
    ensure_data_root, resolve_active_profile_root, resolve_data_root, resolve_data_root_from,
    Profiles, RootSources, ACTIVE_PROFILE_FILE, APP_DIR_NAME, DATA_DIR_ENV, DEFAULT_PROFILE,
    PROFILES_DIR_NAME,
};

static PROFILE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _.\-]{0,63}$").expect("valid profile name regex")
});
static DOCUMENT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^./\\\x00-\x1f][^/\\\x00-\x1f]*$").expect("valid name regex"));

pub type StorageResult<T> = Result<T, StorageError>;

/// What kind of caller-supplied name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Document,
    Profile,
}

impl Display for NameKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document => f.write_str("document"),
            Self::Profile => f.write_str("profile"),
        }
    }
}

#[derive(Debug)]
pub enum StorageError {
    /// Directory or file access failed at the filesystem boundary.
    Io { path: PathBuf, source: io::Error },
    /// A persisted file exists but is not a JSON object.
    MalformedDocument { path: PathBuf, reason: String },
    /// Temp-file creation or atomic replace failed; destination untouched.
    Write { path: PathBuf, source: io::Error },
    /// A document or profile name cannot be mapped onto a file name.
    InvalidName { kind: NameKind, value: String },
    /// The configured data root cannot be used.
    InvalidRoot { path: PathBuf, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error at `{}`: {source}", path.display()),
            Self::MalformedDocument { path, reason } => {
                write!(f, "malformed document `{}`: {reason}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
            Self::InvalidName { kind, value } => write!(f, "invalid {kind} name `{value}`"),
            Self::InvalidRoot { path, reason } => {
                write!(f, "invalid data root `{}`: {reason}", path.display())
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } | Self::Write { source, .. } => Some(source),
            Self::MalformedDocument { .. } | Self::InvalidName { .. } | Self::InvalidRoot { .. } => {
                None
            }
        }
    }
}

/// Validates a caller-supplied document name (file name inside a root).
pub(crate) fn validate_document_name(name: &str) -> StorageResult<()> {
    if DOCUMENT_NAME_RE.is_match(name) && name.trim() == name {
        Ok(())
    } else {
        Err(StorageError::InvalidName {
            kind: NameKind::Document,
            value: name.to_string(),
        })
    }
}

/// Validates a profile folder name.
pub(crate) fn validate_profile_name(name: &str) -> StorageResult<()> {
    if PROFILE_NAME_RE.is_match(name) && name != PROFILES_BACKUP_RESERVED && name.trim() == name {
        Ok(())
    } else {
        Err(StorageError::InvalidName {
            kind: NameKind::Profile,
            value: name.to_string(),
        })
    }
}

// `profiles/backups` shares the folder namespace with profile directories.
const PROFILES_BACKUP_RESERVED: &str = BACKUP_DIR_NAME;
