//! Configuration management for segframe.
//!
//! Settings are loaded from multiple sources in order of precedence, later
//! sources overriding earlier ones:
//! 1. Default configuration (embedded in binary)
//! 2. User-specified configuration file (`--config`)
//! 3. Environment variables prefixed with `SEGFRAME_`, using `__` between
//!    section and key (e.g. `SEGFRAME_QUERY__METRIC=requests/count`)
//! 4. Command-line arguments

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::flatten::FlattenQuery;

/// Command-line arguments that override configuration values
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Metric key to extract (e.g. requests/count)
    #[arg(short, long)]
    pub metric: Option<String>,

    /// Aggregation key inside the metric (e.g. sum, avg)
    #[arg(short, long)]
    pub aggregation: Option<String>,

    /// Grouping dimension, outermost first; repeat for nested dimensions
    #[arg(short, long = "dimension", value_name = "NAME")]
    pub dimensions: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Complete segframe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// What to extract from the response
    pub query: QuerySettings,
    /// How to render the resulting frame
    #[serde(default)]
    pub output: OutputSettings,
}

/// Metric selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySettings {
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub aggregation: String,
    /// Dimension names ordered from outermost to innermost nesting
    #[serde(default)]
    pub dimensions: Vec<String>,
}

/// Output rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ASCII table
    #[default]
    Table,
    /// JSON array of rows
    Json,
    /// Arrow IPC stream
    Ipc,
}

impl Settings {
    /// Load configuration from all sources
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            include_str!("../config/default.toml"),
            config::FileFormat::Toml,
        ));

        // Load user config if specified
        if let Some(path) = &args.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SEGFRAME")
                .prefix_separator("_")
                .separator("__"),
        );

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        // Override with command line args
        if let Some(metric) = &args.metric {
            settings.query.metric = metric.clone();
        }
        if let Some(aggregation) = &args.aggregation {
            settings.query.aggregation = aggregation.clone();
        }
        if !args.dimensions.is_empty() {
            settings.query.dimensions = args.dimensions.clone();
        }
        if let Some(format) = args.format {
            settings.output.format = format;
        }

        Ok(settings)
    }

    /// Builds the flatten query, requiring both metric and aggregation.
    pub fn flatten_query(&self) -> Result<FlattenQuery> {
        if self.query.metric.is_empty() {
            return Err(Error::Config("query.metric is not set".to_string()));
        }
        if self.query.aggregation.is_empty() {
            return Err(Error::Config("query.aggregation is not set".to_string()));
        }
        Ok(FlattenQuery::new(
            self.query.metric.as_str(),
            self.query.aggregation.as_str(),
            self.query.dimensions.iter().cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let settings = Settings::load(&ConfigArgs::default()).unwrap();
        assert_eq!(settings.output.format, OutputFormat::Table);
        assert!(settings.query.dimensions.is_empty());
    }

    #[test]
    fn test_file_then_args_precedence() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[query]\nmetric = \"requests/count\"\naggregation = \"sum\"\ndimensions = [\"region\", \"device\"]\n\n[output]\nformat = \"json\""
        )
        .unwrap();

        let args = ConfigArgs {
            config: Some(file.path().to_path_buf()),
            aggregation: Some("avg".to_string()),
            ..ConfigArgs::default()
        };
        let settings = Settings::load(&args).unwrap();

        assert_eq!(settings.query.metric, "requests/count");
        assert_eq!(settings.query.aggregation, "avg");
        assert_eq!(settings.query.dimensions, vec!["region", "device"]);
        assert_eq!(settings.output.format, OutputFormat::Json);

        let query = settings.flatten_query().unwrap();
        assert_eq!(query.dimensions.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let args = ConfigArgs {
            config: Some(PathBuf::from("/nonexistent/segframe.toml")),
            ..ConfigArgs::default()
        };
        assert!(matches!(Settings::load(&args), Err(Error::Config(_))));
    }

    #[test]
    fn test_flatten_query_requires_metric() {
        let settings = Settings {
            query: QuerySettings {
                aggregation: "sum".to_string(),
                ..QuerySettings::default()
            },
            output: OutputSettings::default(),
        };
        let err = settings.flatten_query().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: query.metric is not set");
    }
}
