//! Per-key dispatch from raw JSON objects onto the segment types.

use serde_json::{Map, Value};

use super::{Segment, Timestamp};
use crate::error::{Error, Result};

/// Parses bytes that must hold a single JSON object.
pub(super) fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(object)) => Ok(object),
        _ => Err(Error::Decode("malformed object".to_string())),
    }
}

pub(super) fn timestamp(field: &str, value: Value) -> Result<Option<Timestamp>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Timestamp::parse(text)
            .map(Some)
            .map_err(|_| Error::type_mismatch(field)),
        _ => Err(Error::type_mismatch(field)),
    }
}

pub(super) fn string(field: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        _ => Err(Error::type_mismatch(field)),
    }
}

/// Decodes a `segments` array, recursing into every element.
pub(super) fn segments(value: Value) -> Result<Option<Vec<Segment>>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(object) => Segment::try_from(object),
                _ => Err(Error::type_mismatch("segments")),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        _ => Err(Error::type_mismatch("segments")),
    }
}

pub(super) fn format_timestamp(ts: Timestamp) -> Value {
    Value::String(ts.into())
}

pub(super) fn encode_segments(segments: Vec<Segment>) -> Value {
    Value::Array(
        segments
            .into_iter()
            .map(|segment| Value::Object(segment.into()))
            .collect(),
    )
}

/// Short name of a JSON value's type, used in error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
