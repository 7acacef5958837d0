//! Arrow export for frames.
//!
//! A [`Frame`] maps onto a single `RecordBatch`:
//! - column 0 is `timestamp`, `Timestamp(Millisecond, "UTC")`, nullable
//! - every value field becomes a nullable `Float64` column named by
//!   [`ValueField::display_name`], with its labels stored as field metadata
//!
//! The frame name is kept in the schema metadata under `name`.

use arrow::ipc::writer::StreamWriter;
use arrow::util::pretty::pretty_format_batches;
use arrow_array::{ArrayRef, Float64Array, RecordBatch, TimestampMillisecondArray};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use lazy_static::lazy_static;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{Frame, ValueField, TIME_FIELD_NAME};
use crate::error::Result;

const TIMEZONE: &str = "UTC";

lazy_static! {
    /// Arrow field for the frame's time column.
    pub static ref TIME_FIELD: Field = Field::new(
        TIME_FIELD_NAME,
        DataType::Timestamp(TimeUnit::Millisecond, Some(TIMEZONE.into())),
        true
    );
}

fn value_field(field: &ValueField) -> Field {
    let metadata: HashMap<String, String> = BTreeMap::from(field.labels.clone()).into_iter().collect();
    Field::new(field.display_name(), DataType::Float64, true).with_metadata(metadata)
}

impl Frame {
    /// Arrow schema matching [`Frame::to_record_batch`].
    pub fn schema(&self) -> Schema {
        let mut fields = Vec::with_capacity(self.column_count());
        fields.push(TIME_FIELD.clone());
        fields.extend(self.fields().iter().map(value_field));

        let mut metadata = HashMap::new();
        if !self.name.is_empty() {
            metadata.insert("name".to_string(), self.name.clone());
        }
        Schema::new(fields).with_metadata(metadata)
    }

    /// Builds an Arrow RecordBatch holding the time column and all value columns.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let times: Vec<Option<i64>> = self
            .times()
            .iter()
            .map(|time| time.map(|ts| ts.timestamp_millis()))
            .collect();

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.column_count());
        columns.push(Arc::new(
            TimestampMillisecondArray::from(times).with_timezone(TIMEZONE),
        ));
        for field in self.fields() {
            columns.push(Arc::new(Float64Array::from(field.values.clone())));
        }

        Ok(RecordBatch::try_new(Arc::new(self.schema()), columns)?)
    }
}

/// Encodes a RecordBatch as an Arrow IPC stream (schema message followed by the batch).
pub fn encode_record_batch(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buffer, batch.schema().as_ref())?;
        writer.write(batch)?;
        writer.finish()?;
    }
    Ok(buffer)
}

/// Writes the batch as a JSON array of row objects. Null cells are omitted.
pub fn record_batch_to_json(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut writer = arrow_json::ArrayWriter::new(Vec::new());
    writer.write(batch)?;
    writer.finish()?;
    Ok(writer.into_inner())
}

/// Renders the batch as an ASCII table.
pub fn pretty_format(batch: &RecordBatch) -> Result<String> {
    Ok(pretty_format_batches(std::slice::from_ref(batch))?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameBuilder, Labels};
    use arrow::array::Array;
    use arrow::ipc::reader::StreamReader;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    fn sample_frame() -> Frame {
        let mut frame = Frame::new("requests/count");
        frame.extend(2);
        frame.set_time(0, Some(Utc.with_ymd_and_hms(2019, 9, 13, 1, 0, 0).unwrap()));
        frame.set_time(1, Some(Utc.with_ymd_and_hms(2019, 9, 13, 2, 0, 0).unwrap()));
        let us = frame.add_field("value", &Labels::new().with("region", "us"));
        frame.set_value(us, 0, Some(1.5));
        let eu = frame.add_field("value", &Labels::new().with("region", "eu"));
        frame.set_value(eu, 1, Some(2.0));
        frame
    }

    #[test]
    fn test_record_batch_shape() {
        let batch = sample_frame().to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 3);

        let schema = batch.schema();
        assert_eq!(schema.field(0).name(), "timestamp");
        assert_eq!(schema.field(1).name(), "value{region=us}");
        assert_eq!(schema.field(1).metadata().get("region").map(String::as_str), Some("us"));
        assert_eq!(schema.metadata().get("name").map(String::as_str), Some("requests/count"));

        let times = batch
            .column(0)
            .as_any()
            .downcast_ref::<TimestampMillisecondArray>()
            .unwrap();
        assert_eq!(times.value(0), 1_568_336_400_000);

        let eu = batch.column(2).as_any().downcast_ref::<Float64Array>().unwrap();
        assert!(eu.is_null(0));
        assert_eq!(eu.value(1), 2.0);
    }

    #[test]
    fn test_ipc_encoding_reads_back() {
        let batch = sample_frame().to_record_batch().unwrap();
        let bytes = encode_record_batch(&batch).unwrap();

        let reader = StreamReader::try_new(Cursor::new(bytes), None).unwrap();
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], batch);
    }

    #[test]
    fn test_json_omits_null_cells() {
        let batch = sample_frame().to_record_batch().unwrap();
        let json = record_batch_to_json(&batch).unwrap();
        let rows: serde_json::Value = serde_json::from_slice(&json).unwrap();

        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0]["value{region=us}"], serde_json::json!(1.5));
        assert!(rows[0].get("value{region=eu}").is_none());
    }

    #[test]
    fn test_pretty_format_contains_headers() {
        let batch = sample_frame().to_record_batch().unwrap();
        let table = pretty_format(&batch).unwrap();
        assert!(table.contains("timestamp"));
        assert!(table.contains("value{region=eu}"));
    }

    #[test]
    fn test_empty_frame_converts() {
        let batch = Frame::default().to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 1);
    }
}
