//! Text encoding for records.
//!
//! # Responsibility
//! - Encode a record as one JSON object in field order
//!   (`id`, `time`, `subject`, `data`, then user fields).
//! - Decode it back, rejecting anything that is not a flat object of scalars.
//!
//! # Invariants
//! - Decoding never executes or interprets input beyond JSON parsing.
//! - A missing or non-numeric `time` is replaced by the clock's time; every
//!   other defect fails the whole decode.

use crate::clock::Clock;
use crate::model::record::{Record, ID_FIELD, TIME_FIELD};
use crate::model::value::FieldValue;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    InvalidId(String),
    /// Field holds a value the encoding cannot carry (null, nested, NaN).
    UnsupportedValue { field: String },
    /// Element `index` of an encoded collection failed to decode.
    InvalidRecord {
        index: usize,
        source: Box<CodecError>,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed record text: {err}"),
            Self::InvalidId(value) => write!(f, "invalid record id `{value}`"),
            Self::UnsupportedValue { field } => {
                write!(f, "field `{field}` holds an unsupported value")
            }
            Self::InvalidRecord { index, source } => {
                write!(f, "record #{index} is malformed: {source}")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidRecord { source, .. } => Some(source.as_ref()),
            Self::InvalidId(_) | Self::UnsupportedValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

struct RecordWire<'a>(&'a Record);

impl Serialize for RecordWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.0;
        let mut map = serializer.serialize_map(Some(record.fields.len() + 2))?;
        map.serialize_entry(ID_FIELD, &record.id.to_string())?;
        map.serialize_entry(TIME_FIELD, &record.time)?;
        for (key, value) in &record.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Record {
    /// Encodes every field, reserved ones included, as a JSON object.
    ///
    /// # Errors
    /// - `UnsupportedValue` when a float field is NaN or infinite.
    pub fn to_text(&self) -> CodecResult<String> {
        for (key, value) in &self.fields {
            if let FieldValue::Float(number) = value {
                if !number.is_finite() {
                    return Err(CodecError::UnsupportedValue { field: key.clone() });
                }
            }
        }
        Ok(serde_json::to_string(&RecordWire(self))?)
    }

    /// Decodes text produced by `to_text`.
    ///
    /// The object does not need every default field: missing ones keep the
    /// values of a freshly created record (a missing `id` gets a new one).
    pub fn from_text(text: &str, clock: &impl Clock) -> CodecResult<Self> {
        let raw: IndexMap<String, Value> = serde_json::from_str(text)?;
        let mut record = Record::new(clock);

        for (key, value) in raw {
            match key.as_str() {
                ID_FIELD => record.id = parse_id(&value)?,
                TIME_FIELD => {
                    record.time = scalar_value(&value)
                        .and_then(|scalar| scalar.to_epoch_seconds())
                        .unwrap_or_else(|| clock.now());
                }
                _ => {
                    let scalar = scalar_value(&value)
                        .ok_or_else(|| CodecError::UnsupportedValue { field: key.clone() })?;
                    record.fields.insert(key, scalar);
                }
            }
        }

        Ok(record)
    }
}

fn parse_id(value: &Value) -> CodecResult<Uuid> {
    match value {
        Value::String(text) => {
            Uuid::parse_str(text).map_err(|_| CodecError::InvalidId(text.clone()))
        }
        other => Err(CodecError::InvalidId(other.to_string())),
    }
}

fn scalar_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Bool(flag) => Some(FieldValue::Bool(*flag)),
        Value::Number(number) => number
            .as_i64()
            .map(FieldValue::Integer)
            .or_else(|| number.as_f64().map(FieldValue::Float)),
        Value::String(text) => Some(FieldValue::Text(text.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
