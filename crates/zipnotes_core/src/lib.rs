//! Core domain logic for ZipNotes.
//! This crate is the single source of truth for record, collection and
//! archive invariants.

pub mod archive;
pub mod clock;
pub mod collection;
pub mod config;
pub mod logging;
pub mod model;
pub mod service;

pub use archive::zip_archive::ZipArchiveFile;
pub use archive::{ArchiveError, ArchiveResult, EntryArchive};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{Collection, CollectionError, CollectionResult, Entry, RecordKey};
pub use config::{ConfigError, Preferences};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::codec::{CodecError, CodecResult};
pub use model::record::{Record, RecordError, RecordId, TimeZoneKind, RESERVED_FIELDS};
pub use model::value::FieldValue;
pub use service::note_service::{NoteService, ServiceError, ServiceResult, NOTES_ENTRY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
