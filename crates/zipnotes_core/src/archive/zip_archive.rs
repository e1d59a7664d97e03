//! Zip-backed archive file.
//!
//! # Responsibility
//! - Store named UTF-8 payloads as deflated zip entries.
//! - Stage every write in a sibling temp file and rename it into place only
//!   after the integrity read-back passes.
//!
//! # Invariants
//! - Every file handle is scoped to a single operation.
//! - A failed write leaves the previous archive (or its absence) untouched.

use super::{ArchiveError, ArchiveResult, EntryArchive};
use log::{info, warn};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive stored at a fixed path on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipArchiveFile {
    path: PathBuf,
}

impl ZipArchiveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_existing(&self) -> ArchiveResult<ZipArchive<File>> {
        if !self.exists() {
            return Err(ArchiveError::Missing(self.path.clone()));
        }
        Ok(ZipArchive::new(File::open(&self.path)?)?)
    }

    fn stage(&self) -> ArchiveResult<NamedTempFile> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Ok(NamedTempFile::new_in(dir)?)
    }

    fn write_first(&self, payload: &str, name: &str, overwrite: bool) -> ArchiveResult<()> {
        validate_entry_name(name)?;
        if !overwrite && self.exists() {
            return Err(ArchiveError::AlreadyExists(self.path.clone()));
        }

        let mut staged = self.stage()?;
        let mut writer = ZipWriter::new(staged.as_file_mut());
        writer.start_file(name, entry_options())?;
        writer.write_all(payload.as_bytes())?;
        writer.finish()?;

        verify_staged(&staged, name, payload)?;
        staged
            .persist(&self.path)
            .map_err(|err| ArchiveError::Io(err.error))?;
        Ok(())
    }

    fn write_next(&self, payload: &str, name: &str) -> ArchiveResult<()> {
        validate_entry_name(name)?;
        if self.list()?.iter().any(|existing| existing == name) {
            return Err(ArchiveError::DuplicateEntry(name.to_string()));
        }

        let mut staged = self.stage()?;
        {
            let mut source = File::open(&self.path)?;
            std::io::copy(&mut source, staged.as_file_mut())?;
        }
        staged.as_file_mut().seek(SeekFrom::Start(0))?;

        let mut writer = ZipWriter::new_append(staged.as_file_mut())?;
        writer.start_file(name, entry_options())?;
        writer.write_all(payload.as_bytes())?;
        writer.finish()?;

        verify_staged(&staged, name, payload)?;
        staged
            .persist(&self.path)
            .map_err(|err| ArchiveError::Io(err.error))?;
        Ok(())
    }
}

impl EntryArchive for ZipArchiveFile {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn destroy(&self) -> ArchiveResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(
                    "event=archive_destroy module=archive status=error error={}",
                    err
                );
                return Err(err.into());
            }
        }
        if self.exists() {
            return Err(ArchiveError::Io(std::io::Error::other(format!(
                "archive still present after removal: {}",
                self.path.display()
            ))));
        }
        info!("event=archive_destroy module=archive status=ok");
        Ok(())
    }

    fn list(&self) -> ArchiveResult<Vec<String>> {
        let mut archive = self.open_existing()?;
        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            names.push(archive.by_index(index)?.name().to_string());
        }
        Ok(names)
    }

    fn read_entry(&self, name: &str) -> ArchiveResult<String> {
        let mut archive = self.open_existing()?;
        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(ArchiveError::EntryNotFound(name.to_string()))
            }
            Err(err) => return Err(err.into()),
        };
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        String::from_utf8(bytes).map_err(|_| ArchiveError::Decode(name.to_string()))
    }

    fn archive_first(&self, payload: &str, name: &str, overwrite: bool) -> ArchiveResult<()> {
        let started_at = Instant::now();
        info!(
            "event=archive_first module=archive status=start overwrite={} bytes={}",
            overwrite,
            payload.len()
        );
        let result = self.write_first(payload, name, overwrite);
        match &result {
            Ok(()) => info!(
                "event=archive_first module=archive status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) if err.is_refusal() => warn!(
                "event=archive_first module=archive status=refused duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
            Err(err) => warn!(
                "event=archive_first module=archive status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn archive_next(&self, payload: &str, name: &str) -> ArchiveResult<()> {
        let started_at = Instant::now();
        info!(
            "event=archive_next module=archive status=start bytes={}",
            payload.len()
        );
        let result = self.write_next(payload, name);
        match &result {
            Ok(()) => info!(
                "event=archive_next module=archive status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=archive_next module=archive status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn validate_entry_name(name: &str) -> ArchiveResult<()> {
    if name.trim().is_empty() || name.ends_with('/') {
        return Err(ArchiveError::InvalidEntryName(name.to_string()));
    }
    Ok(())
}

/// Reads every entry of the staged file to its end (which checks each CRC)
/// and compares the entry just written against its payload.
fn verify_staged(staged: &NamedTempFile, name: &str, payload: &str) -> ArchiveResult<()> {
    let integrity = |entry: &str, detail: String| ArchiveError::Integrity {
        entry: entry.to_string(),
        detail,
    };

    let mut archive =
        ZipArchive::new(staged.reopen()?).map_err(|err| integrity(name, err.to_string()))?;
    let mut found = false;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| integrity(name, err.to_string()))?;
        let entry_name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|err| integrity(&entry_name, err.to_string()))?;
        if entry_name == name {
            if bytes != payload.as_bytes() {
                return Err(integrity(name, "payload mismatch".to_string()));
            }
            found = true;
        }
    }

    if !found {
        return Err(integrity(name, "entry missing after write".to_string()));
    }
    Ok(())
}
