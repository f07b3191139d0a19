#![deny(unreachable_pub)]

//! Streaming liquidity-sweep detection, order-flow features and a
//! sweep-fading mean-reversion strategy for a single instrument.
//!
//! Trade ticks fan out to [`SweepModel`] and [`OrderFlowFeatureExtractor`];
//! book updates feed only the extractor. Sweep events drive
//! [`MeanReversionStrategy`], which also sees every tick for exits.

// Core modules
mod errors;
mod flow;
mod strategy;

pub mod config;
pub mod logging;
pub mod types;

// Offline tooling
pub mod analysis;
pub mod backtest;
pub mod io;

// Re-exports
pub use config::{AnalysisConfig, AppConfig, StrategyConfig, SweepConfig};
pub use errors::{Error, Result};
pub use flow::{OrderBook, OrderFlowFeatureExtractor, RollingExtreme, SweepModel};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use strategy::{ExitReason, MeanReversionStrategy};
pub use types::*;
