//! Record domain model.
//!
//! # Responsibility
//! - Hold one note: identity, timestamp, subject, data and any user fields.
//! - Guard reserved fields against the generic setter.
//! - Derive calendar/display views from the stored timestamp.
//!
//! # Invariants
//! - `id` is generated by the record itself and only changes via reset.
//! - `time` changes only through `set_time` or a reset.
//! - Stored fields keep insertion order; `subject` and `data` always exist
//!   after creation or `reset_all`.

use crate::clock::Clock;
use crate::model::value::FieldValue;
use chrono::{DateTime, FixedOffset, Local, TimeZone};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a record.
pub type RecordId = Uuid;

pub const ID_FIELD: &str = "id";
pub const TIME_FIELD: &str = "time";
pub const SUBJECT_FIELD: &str = "subject";
pub const DATA_FIELD: &str = "data";

/// Field names owned by the record itself.
pub const RESERVED_FIELDS: [&str; 2] = [ID_FIELD, TIME_FIELD];

/// `asctime`-style layout, e.g. `Fri Feb 13 23:31:30 2009`.
const DISPLAY_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub type RecordResult<T> = Result<T, RecordError>;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// `id` and `time` cannot be written through `set`.
    ReservedField(String),
    /// Value is not convertible to epoch seconds.
    InvalidTime(FieldValue),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReservedField(key) => write!(f, "field `{key}` is reserved"),
            Self::InvalidTime(value) => write!(f, "`{value}` is not a valid timestamp"),
        }
    }
}

impl Error for RecordError {}

/// Which clock face to render a timestamp on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoneKind {
    Local,
    Utc,
}

/// A single note entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub(crate) id: RecordId,
    pub(crate) time: i64,
    pub(crate) fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Creates a record with a fresh id, the clock's current time and empty
    /// `subject`/`data`.
    pub fn new(clock: &impl Clock) -> Self {
        let mut record = Self {
            id: Uuid::new_v4(),
            time: clock.now(),
            fields: IndexMap::new(),
        };
        record.reset_fields();
        record
    }

    /// Creates a record stamped with `timestamp`, or with the clock's time
    /// when `timestamp` is not integer-convertible.
    pub fn with_timestamp(clock: &impl Clock, timestamp: impl Into<FieldValue>) -> Self {
        let mut record = Self::new(clock);
        if let Some(seconds) = timestamp.into().to_epoch_seconds() {
            record.time = seconds;
        }
        record
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Unix epoch seconds.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// Sets the timestamp; a non-convertible value leaves it unchanged.
    pub fn set_time(&mut self, value: impl Into<FieldValue>) -> RecordResult<()> {
        let value = value.into();
        match value.to_epoch_seconds() {
            Some(seconds) => {
                self.time = seconds;
                Ok(())
            }
            None => Err(RecordError::InvalidTime(value)),
        }
    }

    /// Subject rendered as text (empty when unset).
    pub fn subject(&self) -> String {
        self.text_field(SUBJECT_FIELD)
    }

    pub fn set_subject(&mut self, value: impl Into<String>) {
        self.fields
            .insert(SUBJECT_FIELD.to_string(), FieldValue::Text(value.into()));
    }

    /// Note body rendered as text (empty when unset).
    pub fn data(&self) -> String {
        self.text_field(DATA_FIELD)
    }

    pub fn set_data(&mut self, value: impl Into<String>) {
        self.fields
            .insert(DATA_FIELD.to_string(), FieldValue::Text(value.into()));
    }

    /// Creates or overwrites a user field.
    ///
    /// # Errors
    /// - `ReservedField` when `key` is `id` or `time`; the record is untouched.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> RecordResult<()> {
        let key = key.into();
        if is_reserved(&key) {
            return Err(RecordError::ReservedField(key));
        }
        self.fields.insert(key, value.into());
        Ok(())
    }

    /// Reads any field, reserved ones included. `None` means "no such field",
    /// which is distinct from a field holding an empty string.
    pub fn get(&self, key: &str) -> Option<Cow<'_, FieldValue>> {
        match key {
            ID_FIELD => Some(Cow::Owned(FieldValue::Text(self.id.to_string()))),
            TIME_FIELD => Some(Cow::Owned(FieldValue::Integer(self.time))),
            other => self.fields.get(other).map(Cow::Borrowed),
        }
    }

    /// All field names: `id`, `time`, then stored fields in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = RESERVED_FIELDS.to_vec();
        keys.extend(self.fields.keys().map(String::as_str));
        keys
    }

    /// Field names accepted by `set`.
    pub fn key_setters(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Every `(name, value)` pair in encoding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldValue)> + '_ {
        let reserved: [(&str, FieldValue); 2] = [
            (ID_FIELD, FieldValue::Text(self.id.to_string())),
            (TIME_FIELD, FieldValue::Integer(self.time)),
        ];
        reserved.into_iter().chain(
            self.fields
                .iter()
                .map(|(key, value)| (key.as_str(), value.clone())),
        )
    }

    /// New id and time; clears `subject`/`data` but keeps every other user
    /// field where it was.
    pub fn reset(&mut self, clock: &impl Clock) {
        self.id = Uuid::new_v4();
        self.time = clock.now();
        self.reset_fields();
    }

    /// New id and time; drops every user field.
    pub fn reset_all(&mut self, clock: &impl Clock) {
        self.fields.clear();
        self.reset(clock);
    }

    /// Calendar view of the timestamp, `None` when it is out of range.
    pub fn time_info(&self, zone: TimeZoneKind) -> Option<DateTime<FixedOffset>> {
        match zone {
            TimeZoneKind::Local => Local
                .timestamp_opt(self.time, 0)
                .single()
                .map(|moment| moment.fixed_offset()),
            TimeZoneKind::Utc => self.time_info_in(FixedOffset::east_opt(0)?),
        }
    }

    /// Calendar view of the timestamp at an explicit UTC offset.
    pub fn time_info_in(&self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp(self.time, 0).map(|moment| moment.with_timezone(&offset))
    }

    /// Classic display string, e.g. `Fri Feb 13 23:31:30 2009`.
    pub fn time_display(&self, zone: TimeZoneKind) -> Option<String> {
        self.time_info(zone)
            .map(|moment| moment.format(DISPLAY_FORMAT).to_string())
    }

    pub fn time_display_in(&self, offset: FixedOffset) -> Option<String> {
        self.time_info_in(offset)
            .map(|moment| moment.format(DISPLAY_FORMAT).to_string())
    }

    fn reset_fields(&mut self) {
        self.set_subject(String::new());
        self.set_data(String::new());
    }

    fn text_field(&self, key: &str) -> String {
        self.fields
            .get(key)
            .map(FieldValue::to_string)
            .unwrap_or_default()
    }
}

pub(crate) fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}
