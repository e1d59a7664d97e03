//! User preferences: where the note archive lives.
//!
//! # Responsibility
//! - Persist the archive location as a small JSON file under a home directory.
//! - Fall back to defaults instead of failing when nothing usable is stored.
//!
//! # Invariants
//! - `load` never fails; `save` replaces the file atomically.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

pub const PREFERENCES_FILE_NAME: &str = "zipnotes.prefs.json";
pub const DEFAULT_ARCHIVE_NAME: &str = "ZipNotes.zip";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Home directory cannot be resolved to an absolute path.
    InvalidHome(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "malformed preferences: {err}"),
            Self::InvalidHome(path) => write!(f, "invalid home directory: {}", path.display()),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidHome(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Stored archive location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preferences {
    /// Folder holding the archive.
    pub database_dir: PathBuf,
    /// Archive file name inside `database_dir`.
    pub archive_name: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            database_dir: PathBuf::from("."),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

/// On-disk shape; absent keys keep the defaults of the home being loaded.
#[derive(Debug, Default, Deserialize)]
struct StoredPreferences {
    database_dir: Option<PathBuf>,
    archive_name: Option<String>,
}

impl StoredPreferences {
    fn over(self, defaults: Preferences) -> Preferences {
        Preferences {
            database_dir: self.database_dir.unwrap_or(defaults.database_dir),
            archive_name: self.archive_name.unwrap_or(defaults.archive_name),
        }
    }
}

impl Preferences {
    /// Defaults rooted at `home`.
    pub fn defaults_for(home: &Path) -> Self {
        Self {
            database_dir: home.to_path_buf(),
            ..Self::default()
        }
    }

    /// Reads preferences stored under `home`.
    ///
    /// A missing, unreadable or malformed file yields `defaults_for(home)`;
    /// a key missing from the file takes its value from the same defaults.
    pub fn load(home: impl AsRef<Path>) -> Self {
        let home = normalize_home(home.as_ref());
        let file = home.join(PREFERENCES_FILE_NAME);
        match read_preferences(&file) {
            Ok(stored) => stored.over(Self::defaults_for(&home)),
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Self::defaults_for(&home)
            }
            Err(err) => {
                warn!(
                    "event=preferences_load module=config status=fallback error={}",
                    err
                );
                Self::defaults_for(&home)
            }
        }
    }

    /// Writes preferences under `home`, replacing any previous file.
    pub fn save(&self, home: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
        let home = home.as_ref();
        if !home.is_dir() {
            return Err(ConfigError::InvalidHome(home.to_path_buf()));
        }
        let home = normalize_home(home);
        let target = home.join(PREFERENCES_FILE_NAME);

        let mut staged = NamedTempFile::new_in(&home)?;
        serde_json::to_writer_pretty(staged.as_file_mut(), self)?;
        staged.as_file_mut().write_all(b"\n")?;
        staged.persist(&target).map_err(|err| ConfigError::Io(err.error))?;

        info!("event=preferences_save module=config status=ok");
        Ok(target)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.database_dir.join(&self.archive_name)
    }
}

/// Absolute, lexically normalized form of `home`. A directory that does not
/// exist is replaced by the current working directory.
pub fn normalize_home(home: &Path) -> PathBuf {
    let candidate = if home.is_dir() {
        home.to_path_buf()
    } else {
        PathBuf::from(".")
    };
    let absolute = if candidate.is_absolute() {
        candidate
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&candidate))
            .unwrap_or(candidate)
    };
    lexical_normalize(&absolute)
}

fn read_preferences(file: &Path) -> Result<StoredPreferences, ConfigError> {
    let text = std::fs::read_to_string(file)?;
    Ok(serde_json::from_str(&text)?)
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
