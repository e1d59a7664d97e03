//! Append-only archive persistence.
//!
//! # Responsibility
//! - Define the archive contract used by services (`EntryArchive`).
//! - Keep container format details inside the zip-backed implementation.
//!
//! # Invariants
//! - Entry bytes are immutable once written; changing a payload means
//!   recreating the whole archive with `archive_first(.., overwrite = true)`.
//! - A write is reported as success only after the archive passes an
//!   integrity read-back.
//! - No locking: a concurrent external writer can corrupt the file.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod zip_archive;

pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Debug)]
pub enum ArchiveError {
    /// `archive_first` without `overwrite` on an existing archive.
    AlreadyExists(PathBuf),
    /// Operation needs an archive that is not there.
    Missing(PathBuf),
    EntryNotFound(String),
    DuplicateEntry(String),
    InvalidEntryName(String),
    /// Entry payload is not UTF-8 text.
    Decode(String),
    /// Read-back after a write did not match what was written.
    Integrity { entry: String, detail: String },
    Io(std::io::Error),
    Zip(zip::result::ZipError),
}

impl ArchiveError {
    /// True for refusals caused by the request itself, false for failures of
    /// the filesystem or the container.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists(_)
                | Self::Missing(_)
                | Self::EntryNotFound(_)
                | Self::DuplicateEntry(_)
                | Self::InvalidEntryName(_)
        )
    }
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(path) => {
                write!(f, "archive already exists: {}", path.display())
            }
            Self::Missing(path) => write!(f, "archive does not exist: {}", path.display()),
            Self::EntryNotFound(name) => write!(f, "archive entry not found: `{name}`"),
            Self::DuplicateEntry(name) => write!(f, "archive entry already present: `{name}`"),
            Self::InvalidEntryName(name) => write!(f, "invalid archive entry name: `{name}`"),
            Self::Decode(name) => write!(f, "archive entry `{name}` is not UTF-8 text"),
            Self::Integrity { entry, detail } => {
                write!(f, "archive failed verification at `{entry}`: {detail}")
            }
            Self::Io(err) => write!(f, "{err}"),
            Self::Zip(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Zip(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Zip(value)
    }
}

/// Container of named text payloads with a two-phase write protocol.
pub trait EntryArchive {
    /// True when the backing file is present.
    fn exists(&self) -> bool;
    /// Removes the backing file; succeeds when it is absent afterwards.
    fn destroy(&self) -> ArchiveResult<()>;
    /// Entry names in stored order.
    fn list(&self) -> ArchiveResult<Vec<String>>;
    fn read_entry(&self, name: &str) -> ArchiveResult<String>;
    /// Creates the archive holding exactly one entry.
    fn archive_first(&self, payload: &str, name: &str, overwrite: bool) -> ArchiveResult<()>;
    /// Adds one entry to an existing archive.
    fn archive_next(&self, payload: &str, name: &str) -> ArchiveResult<()>;
}
