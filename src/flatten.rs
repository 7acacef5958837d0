//! Flattening of segment trees into labeled frames.
//!
//! Each top-level segment of a [`SegmentedResult`] is one time bucket and
//! becomes one row. Below it, every nesting level groups by one of the
//! requested dimensions, outermost first. With `["region", "device"]` a
//! bucket looks like:
//!
//! ```text
//! bucket (start, end)
//! ├── { region: "us", segments: [ { device: "mobile", m: {agg: 1} }, { device: "desktop", ... } ] }
//! └── { region: "eu", segments: [ ... ] }
//! ```
//!
//! Routing nodes contribute their dimension label; data nodes contribute the
//! last dimension's label and the metric value. Each distinct label set gets
//! its own value column, created the first time it is seen.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::frame::{Frame, FrameBuilder, Labels};
use crate::segments::{Segment, SegmentedResult, Timestamp};

/// Name given to every value column; columns are told apart by their labels.
pub const VALUE_FIELD_NAME: &str = "value";

/// Which metric value to extract and which dimensions the response is grouped by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenQuery {
    pub metric: String,
    pub aggregation: String,
    /// Dimension names ordered from outermost to innermost nesting
    pub dimensions: Vec<String>,
}

impl FlattenQuery {
    pub fn new(
        metric: impl Into<String>,
        aggregation: impl Into<String>,
        dimensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            metric: metric.into(),
            aggregation: aggregation.into(),
            dimensions: dimensions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Flattens `result` into a new [`Frame`] named after the metric.
pub fn flatten(
    result: &SegmentedResult,
    metric: &str,
    aggregation: &str,
    dimensions: &[String],
) -> Result<Frame> {
    let query = FlattenQuery::new(metric, aggregation, dimensions.iter().cloned());
    let mut frame: Frame = Flattener::new(&query).flatten_with(result)?;
    frame.name = query.metric;
    Ok(frame)
}

/// Walks one result into a [`FrameBuilder`].
///
/// A flattener is single-use: the column index it builds up belongs to the
/// builder it is writing into.
#[derive(Debug)]
pub struct Flattener<'q> {
    query: &'q FlattenQuery,
    /// Label set -> value column index
    fields: HashMap<Labels, usize>,
}

impl<'q> Flattener<'q> {
    pub fn new(query: &'q FlattenQuery) -> Self {
        Self {
            query,
            fields: HashMap::new(),
        }
    }

    /// Flattens into a fresh builder. Nothing is returned on error.
    pub fn flatten_with<B: FrameBuilder + Default>(mut self, result: &SegmentedResult) -> Result<B> {
        let buckets = result.segments.as_deref().ok_or_else(|| {
            Error::Transform("expected segments not found in insights response".to_string())
        })?;

        let mut builder = B::default();
        for (row, bucket) in buckets.iter().enumerate() {
            builder.extend(1);
            builder.set_time(row, bucket.start.as_ref().map(Timestamp::to_utc));

            if self.query.dimensions.is_empty() {
                self.write_leaf(&mut builder, bucket, Labels::new(), row)?;
                continue;
            }

            // With one dimension an empty bucket is a row without data; deeper
            // queries must route further.
            let children = match bucket.segments.as_deref() {
                Some(children) if !children.is_empty() || self.query.dimensions.len() == 1 => children,
                _ => return Err(Error::unexpected_response(&self.query.dimensions[0])),
            };
            self.walk(&mut builder, children, 0, &Labels::new(), row)?;
        }

        debug!(
            metric = %self.query.metric,
            aggregation = %self.query.aggregation,
            rows = buckets.len(),
            columns = self.fields.len(),
            "flattened segmented result"
        );
        Ok(builder)
    }

    /// Visits the segments found at nesting `depth` below a bucket.
    fn walk<B: FrameBuilder>(
        &mut self,
        builder: &mut B,
        segments: &[Segment],
        depth: usize,
        labels: &Labels,
        row: usize,
    ) -> Result<()> {
        let query = self.query;
        let dimensions = &query.dimensions;
        let last = dimensions.len() - 1;

        for segment in segments {
            let dimension = &dimensions[depth];
            match segment.segments.as_deref() {
                None if depth == last => {
                    let mut labels = labels.clone();
                    labels.insert(dimension.as_str(), segment.dimension_value(dimension)?);
                    self.write_leaf(builder, segment, labels, row)?;
                }
                Some(children) if depth < last && !children.is_empty() => {
                    let mut nested = labels.clone();
                    nested.insert(dimension.as_str(), segment.dimension_value(dimension)?);
                    trace!(depth, dimension = %dimension, labels = %nested, "descending");
                    self.walk(builder, children, depth + 1, &nested, row)?;
                }
                // Data node above the last dimension, routing node at or below it,
                // or a routing node with nothing to descend into.
                _ => return Err(Error::unexpected_response(dimension)),
            }
        }
        Ok(())
    }

    fn write_leaf<B: FrameBuilder>(
        &mut self,
        builder: &mut B,
        segment: &Segment,
        labels: Labels,
        row: usize,
    ) -> Result<()> {
        let value = segment.metric_value(&self.query.metric, &self.query.aggregation)?;

        let field = match self.fields.get(&labels) {
            Some(&field) => field,
            None => {
                let field = builder.add_field(VALUE_FIELD_NAME, &labels);
                trace!(field, labels = %labels, row, "created value field");
                self.fields.insert(labels, field);
                field
            }
        };
        builder.set_value(field, row, value);
        Ok(())
    }
}
