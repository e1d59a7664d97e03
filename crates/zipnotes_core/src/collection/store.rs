//! Ordered record store backing a note list.

use crate::clock::Clock;
use crate::model::codec::{CodecError, CodecResult};
use crate::model::record::{Record, RecordId};
use indexmap::IndexMap;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CollectionResult<T> = Result<T, CollectionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Unique append hit an id that is already keyed (live or deleted).
    DuplicateId(RecordId),
    /// Update/delete target is not keyed in the collection.
    NotFound(RecordId),
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "record already present: {id}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
        }
    }
}

impl Error for CollectionError {}

/// State of one keyed slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Live(Record),
    /// Soft-deleted; removed for good by `Collection::pack`.
    Deleted,
}

impl Entry {
    pub fn as_live(&self) -> Option<&Record> {
        match self {
            Self::Live(record) => Some(record),
            Self::Deleted => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// Anything that names a record: a raw id or the record itself.
pub trait RecordKey {
    fn record_id(&self) -> RecordId;
}

impl RecordKey for RecordId {
    fn record_id(&self) -> RecordId {
        *self
    }
}

impl RecordKey for Record {
    fn record_id(&self) -> RecordId {
        self.id()
    }
}

impl<K: RecordKey + ?Sized> RecordKey for &K {
    fn record_id(&self) -> RecordId {
        (**self).record_id()
    }
}

/// Insertion-ordered map of record id to entry state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    entries: IndexMap<RecordId, Entry>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh record, keys it, and hands it back for editing.
    ///
    /// # Errors
    /// - `DuplicateId` when the generated id is already keyed.
    pub fn create(&mut self, clock: &impl Clock) -> CollectionResult<&mut Record> {
        let record = Record::new(clock);
        let id = record.id();
        self.append(record, true)?;
        self.lookup_mut(id).ok_or(CollectionError::NotFound(id))
    }

    /// True when `key` names a live record.
    pub fn exists(&self, key: impl RecordKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Keys `row` by its id, overwriting any prior entry in place.
    ///
    /// # Errors
    /// - `DuplicateId` when `unique` is set and the id is already keyed,
    ///   live or deleted. Nothing changes in that case.
    pub fn append(&mut self, row: Record, unique: bool) -> CollectionResult<()> {
        let id = row.id();
        if unique && self.entries.contains_key(&id) {
            return Err(CollectionError::DuplicateId(id));
        }
        self.insert_live(row);
        Ok(())
    }

    /// The single write path for live records: an already keyed id keeps its
    /// position and gets the new record.
    fn insert_live(&mut self, row: Record) {
        self.entries.insert(row.id(), Entry::Live(row));
    }

    /// Live record for an id or record, `None` when unknown or deleted.
    pub fn lookup(&self, key: impl RecordKey) -> Option<&Record> {
        self.entries
            .get(&key.record_id())
            .and_then(Entry::as_live)
    }

    pub fn lookup_mut(&mut self, key: impl RecordKey) -> Option<&mut Record> {
        match self.entries.get_mut(&key.record_id()) {
            Some(Entry::Live(record)) => Some(record),
            _ => None,
        }
    }

    /// Stored version of `row`, looked up by its id.
    pub fn read(&self, row: &Record) -> Option<&Record> {
        self.lookup(row)
    }

    /// Replaces the entry for `row`'s id. A deleted entry is revived.
    ///
    /// # Errors
    /// - `NotFound` when the id is not keyed; use `append` for new records.
    pub fn update(&mut self, row: Record) -> CollectionResult<()> {
        match self.entries.get_mut(&row.id()) {
            Some(slot) => {
                *slot = Entry::Live(row);
                Ok(())
            }
            None => Err(CollectionError::NotFound(row.id())),
        }
    }

    /// Soft-deletes the entry for `key`. Deleting twice is allowed.
    ///
    /// # Errors
    /// - `NotFound` when the id is not keyed.
    pub fn delete(&mut self, key: impl RecordKey) -> CollectionResult<()> {
        let id = key.record_id();
        match self.entries.get_mut(&id) {
            Some(slot) => {
                *slot = Entry::Deleted;
                Ok(())
            }
            None => Err(CollectionError::NotFound(id)),
        }
    }

    /// Drops every deleted entry; live entries keep their order.
    pub fn pack(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_deleted());
        debug!(
            "event=collection_pack module=collection status=ok removed={} remaining={}",
            before - self.entries.len(),
            self.entries.len()
        );
    }

    /// Number of live records.
    pub fn count(&self) -> usize {
        self.entries.values().filter(|entry| !entry.is_deleted()).count()
    }

    /// Number of deleted-but-unpacked entries.
    pub fn count_deleted(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_deleted()).count()
    }

    /// Number of keyed entries, live or deleted.
    pub fn len_keys(&self) -> usize {
        self.entries.len()
    }

    /// Subject of every live record, in collection order.
    pub fn get_subjects(&self) -> IndexMap<RecordId, String> {
        self.iter()
            .map(|record| (record.id(), record.subject()))
            .collect()
    }

    /// Live records in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.entries.values().filter_map(Entry::as_live)
    }

    /// Empties the collection, deleted entries included.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Encodes live records as a JSON list of record texts.
    pub fn to_text(&self) -> CodecResult<String> {
        let rows = self
            .iter()
            .map(Record::to_text)
            .collect::<CodecResult<Vec<String>>>()?;
        Ok(serde_json::to_string(&rows)?)
    }

    /// Rebuilds a collection from `to_text` output, in encoded order.
    ///
    /// Any malformed element fails the whole decode. A repeated id keeps the
    /// last record at the position of the first.
    pub fn from_text(text: &str, clock: &impl Clock) -> CodecResult<Self> {
        let rows: Vec<String> = serde_json::from_str(text)?;
        let mut collection = Self::new();
        for (index, row) in rows.iter().enumerate() {
            let record = Record::from_text(row, clock).map_err(|err| CodecError::InvalidRecord {
                index,
                source: Box::new(err),
            })?;
            collection.insert_live(record);
        }
        Ok(collection)
    }
}
