//! Configuration for the detectors, strategy and tooling.
//!
//! All sections deserialize from TOML with per-field defaults, so a partial
//! file (or no file at all) yields a usable configuration:
//!
//! ```toml
//! [sweep]
//! short_window_sec = 0.3
//! long_window_sec = 10.0
//! threshold_ratio = 3.0
//!
//! [strategy]
//! delay_ms = 80.0
//! hold_sec = 5.0
//! tp_bp = 2.0
//! sl_bp = 2.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::logging::LogConfig;

// ============================================================================
// Sweep Detector
// ============================================================================

/// Window and threshold parameters for [`SweepModel`](crate::SweepModel).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Burst window in seconds. Typical sweeps last 0.1-0.5s.
    #[serde(default = "default_short_window_sec")]
    pub short_window_sec: f64,

    /// Baseline window in seconds. Must exceed the burst window.
    #[serde(default = "default_long_window_sec")]
    pub long_window_sec: f64,

    /// Burst ratio (short volume / expected short volume) that latches a sweep.
    /// The latch releases once the ratio falls below half of this.
    #[serde(default = "default_threshold_ratio")]
    pub threshold_ratio: f64,
}

fn default_short_window_sec() -> f64 {
    0.3
}

fn default_long_window_sec() -> f64 {
    10.0
}

fn default_threshold_ratio() -> f64 {
    3.0
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            short_window_sec: default_short_window_sec(),
            long_window_sec: default_long_window_sec(),
            threshold_ratio: default_threshold_ratio(),
        }
    }
}

impl SweepConfig {
    pub fn new(short_window_sec: f64, long_window_sec: f64, threshold_ratio: f64) -> Self {
        Self {
            short_window_sec,
            long_window_sec,
            threshold_ratio,
        }
    }

    pub fn validate(&self) -> Result<()> {
        positive("sweep", "short_window_sec", self.short_window_sec)?;
        positive("sweep", "long_window_sec", self.long_window_sec)?;
        positive("sweep", "threshold_ratio", self.threshold_ratio)?;
        if self.short_window_sec >= self.long_window_sec {
            return Err(Error::invalid_config(
                "sweep",
                format!(
                    "short_window_sec ({}) must be less than long_window_sec ({})",
                    self.short_window_sec, self.long_window_sec
                ),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Strategy
// ============================================================================

/// Entry delay and exit policy for [`MeanReversionStrategy`](crate::MeanReversionStrategy).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Delay between sweep trigger and entry, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: f64,

    /// Maximum holding time in seconds.
    #[serde(default = "default_hold_sec")]
    pub hold_sec: f64,

    /// Take-profit in basis points of entry price.
    #[serde(default = "default_tp_bp")]
    pub tp_bp: f64,

    /// Stop-loss in basis points of entry price.
    #[serde(default = "default_sl_bp")]
    pub sl_bp: f64,
}

fn default_delay_ms() -> f64 {
    80.0
}

fn default_hold_sec() -> f64 {
    5.0
}

fn default_tp_bp() -> f64 {
    2.0
}

fn default_sl_bp() -> f64 {
    2.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            hold_sec: default_hold_sec(),
            tp_bp: default_tp_bp(),
            sl_bp: default_sl_bp(),
        }
    }
}

impl StrategyConfig {
    pub fn new(delay_ms: f64, hold_sec: f64, tp_bp: f64, sl_bp: f64) -> Self {
        Self {
            delay_ms,
            hold_sec,
            tp_bp,
            sl_bp,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delay_ms.is_finite() || self.delay_ms < 0.0 {
            return Err(Error::invalid_config(
                "strategy",
                format!("delay_ms must be finite and >= 0, got {}", self.delay_ms),
            ));
        }
        positive("strategy", "hold_sec", self.hold_sec)?;
        positive("strategy", "tp_bp", self.tp_bp)?;
        positive("strategy", "sl_bp", self.sl_bp)?;
        Ok(())
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Forward-return analysis settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Look-ahead horizon after each sweep, in seconds.
    #[serde(default = "default_horizon_sec")]
    pub horizon_sec: f64,
}

fn default_horizon_sec() -> f64 {
    30.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            horizon_sec: default_horizon_sec(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        positive("analysis", "horizon_sec", self.horizon_sec)
    }
}

// ============================================================================
// Application
// ============================================================================

/// Top-level config file layout for the `sweep_core` tool.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.sweep.validate()?;
        self.strategy.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}

fn positive(component: &'static str, field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(
            component,
            format!("{field} must be finite and > 0, got {value}"),
        ))
    }
}
