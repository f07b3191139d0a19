//! Sweep detector outputs.

use serde::{Deserialize, Serialize};

/// Per-tick output of the sweep detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[repr(i8)]
pub enum SweepSignal {
    #[default]
    NoSignal = 0,
    UpSweep = 1,
    DownSweep = -1,
}

impl SweepSignal {
    pub fn is_signal(self) -> bool {
        !matches!(self, SweepSignal::NoSignal)
    }

    /// Integer code: +1 up, -1 down, 0 none.
    pub fn direction(self) -> i8 {
        self as i8
    }
}

/// Metadata of the most recent detected sweep.
///
/// `price_start` is the price of the tick preceding the trigger, not the price
/// at `ts_start`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct SweepEvent {
    /// Trigger time minus the short window
    pub ts_start: f64,
    /// Trigger time
    pub ts_end: f64,
    pub price_start: f64,
    pub price_end: f64,
    /// Total short-window volume at trigger
    pub volume_total: f64,
    /// +1 up, -1 down, 0 when no event has fired yet
    pub direction: i8,
}

impl SweepEvent {
    pub fn is_up(&self) -> bool {
        self.direction > 0
    }

    pub fn is_down(&self) -> bool {
        self.direction < 0
    }
}
