use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::commands::{ConvertCommand, InspectCommand};
use crate::config::{OutputFormat, Settings};
use crate::flatten::flatten;
use crate::frame::record_batch::{encode_record_batch, pretty_format, record_batch_to_json};
use crate::segments::{decode_payload, SegmentedResult, Timestamp};

/// Reads the whole input, `-` meaning stdin.
fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read response from stdin")?;
        Ok(buffer)
    } else {
        fs::read(path).with_context(|| format!("Failed to read response from {}", path.display()))
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, bytes)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write output")?;
            stdout.flush().context("Failed to flush output")
        }
    }
}

pub fn handle_convert(cmd: &ConvertCommand) -> Result<()> {
    let settings = Settings::load(&cmd.config).context("Failed to load configuration")?;
    let query = settings.flatten_query()?;

    let bytes = read_input(&cmd.input)?;
    let result = decode_payload(&bytes).context("Failed to decode metrics response")?;
    let frame = flatten(&result, &query.metric, &query.aggregation, &query.dimensions)
        .context("Failed to flatten metrics response")?;

    info!(
        rows = frame.row_count(),
        columns = frame.column_count(),
        "Converted {} {}",
        query.metric,
        query.aggregation
    );

    let batch = frame.to_record_batch()?;
    let rendered = match settings.output.format {
        OutputFormat::Table => {
            let mut table = pretty_format(&batch)?;
            table.push('\n');
            table.into_bytes()
        }
        OutputFormat::Json => {
            let mut json = record_batch_to_json(&batch)?;
            json.push(b'\n');
            json
        }
        OutputFormat::Ipc => {
            if cmd.output.is_none() {
                warn!("Writing Arrow IPC stream to stdout");
            }
            encode_record_batch(&batch)?
        }
    };

    write_output(cmd.output.as_deref(), &rendered)
}

pub fn handle_inspect(cmd: &InspectCommand) -> Result<()> {
    let bytes = read_input(&cmd.input)?;
    let result = decode_payload(&bytes).context("Failed to decode metrics response")?;
    write_output(None, summarize(&result).as_bytes())
}

/// Human-readable summary of a decoded result's shape.
pub fn summarize(result: &SegmentedResult) -> String {
    fn time(ts: Option<&Timestamp>) -> &str {
        ts.map(Timestamp::as_str).unwrap_or("-")
    }

    let mut out = String::new();
    let _ = writeln!(out, "start:    {}", time(result.start.as_ref()));
    let _ = writeln!(out, "end:      {}", time(result.end.as_ref()));
    let _ = writeln!(out, "interval: {}", result.interval.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "buckets:  {}", result.bucket_count());
    let _ = writeln!(out, "depth:    {}", result.depth());
    if !result.properties.is_empty() {
        let keys: Vec<&str> = result.properties.keys().map(String::as_str).collect();
        let _ = writeln!(out, "extra:    {}", keys.join(", "));
    }
    for (depth, keys) in result.property_keys_by_depth().iter().enumerate() {
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let _ = writeln!(out, "level {}:  {}", depth, keys.join(", "));
    }
    out
}
