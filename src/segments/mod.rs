//! Decoding of segmented metrics responses.
//!
//! A segmented response nests one level of `segments` per requested grouping
//! dimension. Only `start`, `end`, `interval` and `segments` are fixed field
//! names; everything else (dimension values, the `metric -> aggregation ->
//! value` object) is data-dependent and lands in an open `properties` map so
//! nothing is dropped:
//!
//! ```json
//! {
//!   "start": "2019-09-13T01:00:00Z",
//!   "end": "2019-09-13T02:00:00Z",
//!   "interval": "PT1H",
//!   "segments": [
//!     {
//!       "start": "2019-09-13T01:00:00Z",
//!       "end": "2019-09-13T02:00:00Z",
//!       "segments": [
//!         { "request/success": "False", "requests/count": { "sum": 2 } },
//!         { "request/success": "True", "requests/count": { "sum": 14 } }
//!       ]
//!     }
//!   ]
//! }
//! ```

mod decode;
mod timestamp;

pub(crate) use decode::kind;
pub use timestamp::Timestamp;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// A node of the segment tree.
///
/// A node with `segments` is a routing node that contributes one dimension
/// label; a node without is a data node carrying metric values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Segment {
    /// Start of the segment's time window
    pub start: Option<Timestamp>,
    /// End of the segment's time window
    pub end: Option<Timestamp>,
    /// Nested segments, one per value of the next dimension
    pub segments: Option<Vec<Segment>>,
    /// Every key that is not a known field
    pub properties: Map<String, Value>,
}

/// The top-level decoded result of a metrics query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct SegmentedResult {
    /// Start of the queried time span
    pub start: Option<Timestamp>,
    /// End of the queried time span
    pub end: Option<Timestamp>,
    /// Bucket interval as sent by the API (ISO 8601 duration, e.g. `PT1H`)
    pub interval: Option<String>,
    /// Top-level segments, one per time bucket
    pub segments: Option<Vec<Segment>>,
    /// Every key that is not a known field
    pub properties: Map<String, Value>,
}

/// Response envelope wrapping a result under `value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SegmentedResult>,
}

impl Segment {
    /// Whether this node carries metric values rather than child segments.
    pub fn is_leaf(&self) -> bool {
        self.segments.is_none()
    }

    pub fn children(&self) -> &[Segment] {
        self.segments.as_deref().unwrap_or(&[])
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Reads the string value of `dimension` from this node's properties.
    pub fn dimension_value(&self, dimension: &str) -> Result<&str> {
        match self.properties.get(dimension) {
            Some(Value::String(value)) => Ok(value),
            Some(other) => Err(Error::Transform(format!(
                "unexpected type for dimension {}, want string but got {}",
                dimension,
                kind(other)
            ))),
            None => Err(Error::Transform(format!(
                "expected dimension {} not found in segment",
                dimension
            ))),
        }
    }

    /// Extracts `properties[metric][aggregation]`.
    ///
    /// A missing metric or aggregation is an error; a present but non-numeric
    /// value (the API nulls out sparse buckets) is `None`.
    pub fn metric_value(&self, metric: &str, aggregation: &str) -> Result<Option<f64>> {
        let values = match self.properties.get(metric) {
            Some(Value::Object(values)) => values,
            Some(other) => {
                return Err(Error::Transform(format!(
                    "unexpected type for metric {} in leaf segment, want object but got {}",
                    metric,
                    kind(other)
                )))
            }
            None => {
                return Err(Error::Transform(format!(
                    "expected additional properties for metric {} not found in leaf segment",
                    metric
                )))
            }
        };

        let value = values.get(aggregation).ok_or_else(|| {
            Error::Transform(format!(
                "expected value for aggregation {} not found in leaf segment",
                aggregation
            ))
        })?;

        Ok(value.as_f64())
    }

    /// Number of segment levels below this node.
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    fn collect_keys(&self, depth: usize, keys: &mut Vec<BTreeSet<String>>) {
        if keys.len() <= depth {
            keys.resize_with(depth + 1, BTreeSet::new);
        }
        keys[depth].extend(self.properties.keys().cloned());
        for child in self.children() {
            child.collect_keys(depth + 1, keys);
        }
    }
}

impl SegmentedResult {
    pub fn segments(&self) -> &[Segment] {
        self.segments.as_deref().unwrap_or(&[])
    }

    /// Number of top-level segments, i.e. time buckets.
    pub fn bucket_count(&self) -> usize {
        self.segments().len()
    }

    /// Deepest segment nesting, counting the top-level segments as 1.
    pub fn depth(&self) -> usize {
        self.segments()
            .iter()
            .map(|segment| segment.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Distinct property keys seen at each nesting level, top-level segments first.
    pub fn property_keys_by_depth(&self) -> Vec<BTreeSet<String>> {
        let mut keys = Vec::new();
        for segment in self.segments() {
            segment.collect_keys(0, &mut keys);
        }
        keys
    }
}

impl MetricsResponse {
    /// Returns the wrapped result, failing if the envelope was empty.
    pub fn into_result(self) -> Result<SegmentedResult> {
        self.value
            .ok_or_else(|| Error::Decode("response has no value".to_string()))
    }
}

impl TryFrom<Map<String, Value>> for Segment {
    type Error = Error;

    fn try_from(object: Map<String, Value>) -> Result<Self> {
        let mut segment = Segment::default();
        for (key, value) in object {
            match key.as_str() {
                "start" => segment.start = decode::timestamp("start", value)?,
                "end" => segment.end = decode::timestamp("end", value)?,
                "segments" => segment.segments = decode::segments(value)?,
                _ => {
                    segment.properties.insert(key, value);
                }
            }
        }
        Ok(segment)
    }
}

impl TryFrom<Map<String, Value>> for SegmentedResult {
    type Error = Error;

    fn try_from(object: Map<String, Value>) -> Result<Self> {
        let mut result = SegmentedResult::default();
        for (key, value) in object {
            match key.as_str() {
                "start" => result.start = decode::timestamp("start", value)?,
                "end" => result.end = decode::timestamp("end", value)?,
                "interval" => result.interval = decode::string("interval", value)?,
                "segments" => result.segments = decode::segments(value)?,
                _ => {
                    result.properties.insert(key, value);
                }
            }
        }
        Ok(result)
    }
}

impl From<Segment> for Map<String, Value> {
    fn from(segment: Segment) -> Self {
        let mut object = segment.properties;
        if let Some(start) = segment.start {
            object.insert("start".to_string(), decode::format_timestamp(start));
        }
        if let Some(end) = segment.end {
            object.insert("end".to_string(), decode::format_timestamp(end));
        }
        if let Some(children) = segment.segments {
            object.insert("segments".to_string(), decode::encode_segments(children));
        }
        object
    }
}

impl From<SegmentedResult> for Map<String, Value> {
    fn from(result: SegmentedResult) -> Self {
        let mut object = result.properties;
        if let Some(start) = result.start {
            object.insert("start".to_string(), decode::format_timestamp(start));
        }
        if let Some(end) = result.end {
            object.insert("end".to_string(), decode::format_timestamp(end));
        }
        if let Some(interval) = result.interval {
            object.insert("interval".to_string(), Value::String(interval));
        }
        if let Some(segments) = result.segments {
            object.insert("segments".to_string(), decode::encode_segments(segments));
        }
        object
    }
}

/// Decodes a single segment object.
pub fn decode_segment(bytes: &[u8]) -> Result<Segment> {
    Segment::try_from(decode::parse_object(bytes)?)
}

/// Decodes a result object (`start`, `end`, `interval`, `segments`).
pub fn decode_result(bytes: &[u8]) -> Result<SegmentedResult> {
    let result = SegmentedResult::try_from(decode::parse_object(bytes)?)?;
    debug!(
        buckets = result.bucket_count(),
        interval = result.interval.as_deref().unwrap_or(""),
        "decoded segmented result"
    );
    Ok(result)
}

/// Decodes a `{"value": {...}}` response envelope.
pub fn decode_response(bytes: &[u8]) -> Result<MetricsResponse> {
    let object = decode::parse_object(bytes)?;
    response_from_object(object)
}

/// Decodes either a response envelope or a bare result.
///
/// An object is treated as an envelope when it has a `value` key and none of
/// the result's own fields.
pub fn decode_payload(bytes: &[u8]) -> Result<SegmentedResult> {
    let object = decode::parse_object(bytes)?;
    let is_envelope = object.contains_key("value")
        && !["start", "end", "interval", "segments"]
            .iter()
            .any(|key| object.contains_key(*key));

    if is_envelope {
        debug!("decoding payload as response envelope");
        response_from_object(object)?.into_result()
    } else {
        SegmentedResult::try_from(object)
    }
}

fn response_from_object(mut object: Map<String, Value>) -> Result<MetricsResponse> {
    let value = match object.remove("value") {
        None | Some(Value::Null) => None,
        Some(Value::Object(result)) => Some(SegmentedResult::try_from(result)?),
        Some(_) => return Err(Error::type_mismatch("value")),
    };
    Ok(MetricsResponse { value })
}
