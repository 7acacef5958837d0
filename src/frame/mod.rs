//! Labeled time-series frames.
//!
//! A frame is the tabular output of flattening: a time column (column 0)
//! followed by value columns that are created lazily, one per distinct
//! label set. All columns share the same row count; cells that were never
//! written stay `None`.

pub mod record_batch;
mod labels;

pub use labels::Labels;

use chrono::{DateTime, Utc};

/// Name of the time column.
pub const TIME_FIELD_NAME: &str = "timestamp";

/// Append-only table construction used by the flattener.
///
/// Implementations own the storage; the flattener only creates labeled value
/// columns, grows rows, and writes cells.
pub trait FrameBuilder {
    /// Appends a value column and returns its index among the value columns.
    fn add_field(&mut self, name: &str, labels: &Labels) -> usize;

    /// Appends `rows` empty rows to the time column and every value column.
    fn extend(&mut self, rows: usize);

    fn set_time(&mut self, row: usize, time: Option<DateTime<Utc>>);

    fn set_value(&mut self, field: usize, row: usize, value: Option<f64>);
}

/// A value column of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueField {
    pub name: String,
    pub labels: Labels,
    pub values: Vec<Option<f64>>,
}

impl ValueField {
    /// Column name that stays unique across label sets, e.g. `value{region=us}`.
    pub fn display_name(&self) -> String {
        if self.labels.is_empty() {
            self.name.clone()
        } else {
            format!("{}{{{}}}", self.name, self.labels.signature())
        }
    }
}

/// In-memory frame with a nullable time column and nullable float columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub name: String,
    times: Vec<Option<DateTime<Utc>>>,
    fields: Vec<ValueField>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.times.len()
    }

    /// Number of columns including the time column.
    pub fn column_count(&self) -> usize {
        self.fields.len() + 1
    }

    pub fn times(&self) -> &[Option<DateTime<Utc>>] {
        &self.times
    }

    pub fn fields(&self) -> &[ValueField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&ValueField> {
        self.fields.get(index)
    }

    pub fn field_by_labels(&self, labels: &Labels) -> Option<&ValueField> {
        self.fields.iter().find(|field| &field.labels == labels)
    }
}

impl FrameBuilder for Frame {
    fn add_field(&mut self, name: &str, labels: &Labels) -> usize {
        self.fields.push(ValueField {
            name: name.to_string(),
            labels: labels.clone(),
            values: vec![None; self.times.len()],
        });
        self.fields.len() - 1
    }

    fn extend(&mut self, rows: usize) {
        let len = self.times.len() + rows;
        self.times.resize(len, None);
        for field in &mut self.fields {
            field.values.resize(len, None);
        }
    }

    fn set_time(&mut self, row: usize, time: Option<DateTime<Utc>>) {
        self.times[row] = time;
    }

    fn set_value(&mut self, field: usize, row: usize, value: Option<f64>) {
        self.fields[field].values[row] = value;
    }
}
