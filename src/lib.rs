//! Decoding and flattening of segmented metrics responses.
//!
//! This crate provides the core functionality for:
//! - Decoding schema-flexible segment trees, keeping unknown keys as JSON values
//! - Flattening a segment tree into a labeled time-series frame, one row per
//!   time bucket and one value column per distinct dimension combination
//! - Exporting frames as Arrow record batches
//!
//! ```
//! use segframe_core::{decode_result, flatten};
//!
//! let body = br#"{
//!     "start": "2019-09-13T01:00:00Z",
//!     "end": "2019-09-13T03:00:00Z",
//!     "interval": "PT1H",
//!     "segments": [
//!         {"start": "2019-09-13T01:00:00Z", "segments": [
//!             {"client/os": "Windows", "requests/count": {"sum": 4}},
//!             {"client/os": "Linux", "requests/count": {"sum": 2}}
//!         ]},
//!         {"start": "2019-09-13T02:00:00Z", "segments": [
//!             {"client/os": "Linux", "requests/count": {"sum": 7}}
//!         ]}
//!     ]
//! }"#;
//!
//! let result = decode_result(body).unwrap();
//! let frame = flatten(&result, "requests/count", "sum", &["client/os".to_string()]).unwrap();
//!
//! assert_eq!(frame.row_count(), 2);
//! assert_eq!(frame.fields().len(), 2);
//! assert_eq!(frame.fields()[1].values, vec![Some(2.0), Some(7.0)]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod flatten;
pub mod frame;
pub mod segments;

// Re-export commonly used types
pub use error::{Error, Result};
pub use flatten::{flatten, FlattenQuery, Flattener};
pub use frame::{Frame, FrameBuilder, Labels, ValueField};
pub use segments::{
    decode_payload, decode_response, decode_result, decode_segment, MetricsResponse, Segment,
    SegmentedResult, Timestamp,
};
