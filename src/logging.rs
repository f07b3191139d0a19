//! Structured logging setup.
//!
//! The streaming components log through `tracing` under the targets in
//! [`targets`]; this module only wires a subscriber for the binary (or any host
//! that wants the same output).
//!
//! # Example Usage
//!
//! ```bash
//! # Trace every burst ratio computed by the sweep detector
//! RUST_LOG=sweep_core::sweep=trace cargo run -- backtest --ticks ticks_eth.csv
//!
//! # Strategy decisions only
//! RUST_LOG=warn,sweep_core::strategy=info cargo run -- backtest --ticks ticks_eth.csv
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::errors::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON format (best for log aggregation)
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(Error::Config(format!(
                "Unknown log format '{other}'. Use: pretty, json, compact"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LogConfig {
    /// Level or filter directive used when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Format for stdout logging
    #[serde(default)]
    pub format: LogFormat,

    /// When set, also write daily-rotated JSON logs into this directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            log_dir: None,
        }
    }
}

/// Initialize the global subscriber.
///
/// Returns the file writer guard when file logging is enabled; it must be kept
/// alive for buffered lines to be flushed.
pub fn init_logging(config: &LogConfig, level_override: Option<&str>) -> Result<Option<WorkerGuard>> {
    let level = level_override.unwrap_or(config.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;
        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "sweep_core.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = fmt::layer().with_writer(writer).with_ansi(false).json();

        let result = match config.format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(fmt::layer().json())
                .try_init(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(fmt::layer().compact())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(fmt::layer().with_target(false))
                .try_init(),
        };
        result.map_err(|e| Error::Config(e.to_string()))?;
        return Ok(Some(guard));
    }

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
    };
    result.map_err(|e| Error::Config(e.to_string()))?;
    Ok(None)
}

/// Log targets for component-specific filtering.
pub mod targets {
    /// Sweep detector latch transitions and burst ratios
    pub const SWEEP: &str = "sweep_core::sweep";
    /// Order-flow feature extraction and book maintenance
    pub const FEATURES: &str = "sweep_core::features";
    /// Strategy entries and exits
    pub const STRATEGY: &str = "sweep_core::strategy";
    /// Offline replay and analysis
    pub const REPLAY: &str = "sweep_core::replay";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_config_deserialize() {
        let config: LogConfig = toml::from_str("format = \"json\"\nlog_dir = \"logs\"").unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, Some(PathBuf::from("logs")));
    }
}
