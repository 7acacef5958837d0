//! Shared response fixtures for integration tests

#![allow(dead_code)]

use segframe_core::{decode_result, SegmentedResult};
use serde_json::{json, Value};

pub const METRIC: &str = "requests/count";
pub const AGGREGATION: &str = "sum";

pub fn decode(body: &Value) -> SegmentedResult {
    decode_result(body.to_string().as_bytes()).expect("fixture should decode")
}

pub fn dimensions(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn bucket_start(hour: u32) -> String {
    format!("2019-09-13T{:02}:00:00Z", hour)
}

fn bucket_end(hour: u32) -> String {
    format!("2019-09-13T{:02}:00:00Z", hour + 1)
}

/// A data segment carrying `requests/count.sum` and any extra properties.
pub fn data(value: Value, extra: &[(&str, &str)]) -> Value {
    let mut segment = json!({ METRIC: { AGGREGATION: value } });
    for (key, val) in extra {
        segment[*key] = json!(val);
    }
    segment
}

/// Ungrouped response: one data segment per hour.
pub fn ungrouped(values: &[Value]) -> Value {
    let segments: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(hour, value)| {
            let hour = hour as u32 + 1;
            let mut segment = data(value.clone(), &[]);
            segment["start"] = json!(bucket_start(hour));
            segment["end"] = json!(bucket_end(hour));
            segment
        })
        .collect();

    json!({
        "start": bucket_start(1),
        "end": bucket_end(values.len() as u32),
        "interval": "PT1H",
        "segments": segments
    })
}

/// Response grouped by one dimension. Each bucket lists `(value, count)` pairs.
pub fn grouped_by(dimension: &str, buckets: &[&[(&str, f64)]]) -> Value {
    let segments: Vec<Value> = buckets
        .iter()
        .enumerate()
        .map(|(hour, leaves)| {
            let hour = hour as u32 + 1;
            let children: Vec<Value> = leaves
                .iter()
                .map(|&(value, count)| data(json!(count), &[(dimension, value)]))
                .collect();
            json!({ "start": bucket_start(hour), "end": bucket_end(hour), "segments": children })
        })
        .collect();

    json!({ "interval": "PT1H", "segments": segments })
}

/// One bucket grouped by region then device, every region having every device.
pub fn region_device(regions: &[&str], devices: &[&str]) -> Value {
    let mut count = 0.0;
    let region_segments: Vec<Value> = regions
        .iter()
        .map(|region| {
            let device_segments: Vec<Value> = devices
                .iter()
                .map(|device| {
                    count += 1.0;
                    data(json!(count), &[("device", *device)])
                })
                .collect();
            json!({
                "start": bucket_start(1),
                "end": bucket_end(1),
                "region": region,
                "segments": device_segments
            })
        })
        .collect();

    json!({
        "start": bucket_start(1),
        "end": bucket_end(1),
        "segments": [{ "start": bucket_start(1), "end": bucket_end(1), "segments": region_segments }]
    })
}
