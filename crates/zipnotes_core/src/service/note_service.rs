//! Note use-case service.
//!
//! # Responsibility
//! - Load the note list from an archive and save it back.
//! - Manage extra named payloads (attachments) stored beside the note list.
//!
//! # Invariants
//! - The note list lives in the `NOTES_ENTRY` entry and nowhere else.
//! - Saving recreates the archive and carries every attachment over in order.
//! - Deleted notes are never written.

use crate::archive::{ArchiveError, EntryArchive};
use crate::clock::Clock;
use crate::collection::Collection;
use crate::model::codec::CodecError;
use crate::model::record::{Record, DATA_FIELD, SUBJECT_FIELD};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Archive entry holding the encoded note list.
pub const NOTES_ENTRY: &str = "notes.lst";

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Archive(ArchiveError),
    Codec(CodecError),
    /// Attachment name collides with the note list entry.
    ReservedEntry(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::ReservedEntry(name) => write!(f, "entry name `{name}` is reserved"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Archive(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::ReservedEntry(_) => None,
        }
    }
}

impl From<ArchiveError> for ServiceError {
    fn from(value: ArchiveError) -> Self {
        Self::Archive(value)
    }
}

impl From<CodecError> for ServiceError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Note list persistence over an archive.
pub struct NoteService<A: EntryArchive, C: Clock> {
    archive: A,
    clock: C,
}

impl<A: EntryArchive, C: Clock> NoteService<A, C> {
    pub fn new(archive: A, clock: C) -> Self {
        Self { archive, clock }
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Reads the note list; an archive that does not exist yet is empty.
    pub fn load(&self) -> ServiceResult<Collection> {
        if !self.archive.exists() {
            info!("event=notes_load module=service status=ok source=empty");
            return Ok(Collection::new());
        }
        let text = self.archive.read_entry(NOTES_ENTRY)?;
        let collection = Collection::from_text(&text, &self.clock)?;
        info!(
            "event=notes_load module=service status=ok count={}",
            collection.count()
        );
        Ok(collection)
    }

    /// Writes the live notes of `collection`, recreating the archive.
    ///
    /// Attachments are read before anything is written, so a read failure
    /// leaves the archive as it was.
    pub fn save(&self, collection: &Collection) -> ServiceResult<()> {
        let started_at = Instant::now();
        let payload = collection.to_text()?;
        let carried = self.read_attachments()?;

        let result = self
            .archive
            .archive_first(&payload, NOTES_ENTRY, true)
            .and_then(|()| {
                carried
                    .iter()
                    .try_for_each(|(name, body)| self.archive.archive_next(body, name))
            });

        match result {
            Ok(()) => {
                info!(
                    "event=notes_save module=service status=ok count={} attachments={} duration_ms={}",
                    collection.count(),
                    carried.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=notes_save module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Appends a named payload beside the note list.
    ///
    /// # Errors
    /// - `ReservedEntry` for `NOTES_ENTRY`.
    /// - `Archive(Missing)` when nothing has been saved yet.
    pub fn attach(&self, name: &str, payload: &str) -> ServiceResult<()> {
        if name == NOTES_ENTRY {
            return Err(ServiceError::ReservedEntry(name.to_string()));
        }
        self.archive.archive_next(payload, name)?;
        Ok(())
    }

    pub fn attachment(&self, name: &str) -> ServiceResult<String> {
        if name == NOTES_ENTRY {
            return Err(ServiceError::ReservedEntry(name.to_string()));
        }
        Ok(self.archive.read_entry(name)?)
    }

    /// Attachment names in stored order.
    pub fn attachments(&self) -> ServiceResult<Vec<String>> {
        if !self.archive.exists() {
            return Ok(Vec::new());
        }
        Ok(self
            .archive
            .list()?
            .into_iter()
            .filter(|name| name != NOTES_ENTRY)
            .collect())
    }

    /// Copy of `source` under a new id and time, all fields carried over.
    pub fn clone_note(&self, source: &Record) -> Record {
        let mut copy = source.clone();
        copy.reset(&self.clock);
        for key in [SUBJECT_FIELD, DATA_FIELD] {
            if let Some(value) = source.fields.get(key) {
                copy.fields.insert(key.to_string(), value.clone());
            }
        }
        copy
    }

    fn read_attachments(&self) -> ServiceResult<Vec<(String, String)>> {
        self.attachments()?
            .into_iter()
            .map(|name| {
                let body = self.archive.read_entry(&name)?;
                Ok((name, body))
            })
            .collect()
    }
}
