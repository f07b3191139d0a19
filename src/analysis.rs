//! Offline forward-return analysis of detected sweeps.
//!
//! For each sweep, measures what price did over the following horizon:
//! the close-to-close return, the maximum favourable excursion (in the
//! sweep's direction) and the maximum adverse excursion.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::flow::SweepModel;
use crate::logging::targets;
use crate::types::{SweepEvent, Tick};

/// Price path following one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SweepOutcome {
    pub direction: i8,
    pub ts_end: f64,
    /// Price of the first tick at or after the trigger
    pub entry_price: f64,
    /// Return to the last tick inside the horizon
    pub ret: f64,
    /// Best excursion in the sweep's direction
    pub mfe: f64,
    /// Worst excursion against the sweep's direction
    pub mae: f64,
    pub volume_total: f64,
}

/// Replay `ticks` through `model` and collect every directional sweep.
pub fn collect_sweeps(model: &mut SweepModel, ticks: &[Tick]) -> Vec<SweepEvent> {
    let events: Vec<SweepEvent> = ticks
        .iter()
        .filter_map(|tick| model.process_tick(tick).is_signal().then(|| model.last_event()))
        .filter(|event| event.direction != 0)
        .collect();
    debug!(target: targets::REPLAY, ticks = ticks.len(), sweeps = events.len(), "sweeps collected");
    events
}

/// Measure each event over `horizon_sec` of the time-ordered `ticks`.
///
/// Events with no tick inside `[ts_end, ts_end + horizon_sec]` are dropped.
pub fn forward_outcomes(
    ticks: &[Tick],
    events: &[SweepEvent],
    horizon_sec: f64,
) -> Vec<SweepOutcome> {
    let mut events = events.to_vec();
    events.sort_by(|a, b| a.ts_end.total_cmp(&b.ts_end));

    let mut outcomes = Vec::with_capacity(events.len());
    let mut cursor = 0;

    for event in &events {
        let t0 = event.ts_end;
        let t1 = t0 + horizon_sec;

        // Events are in trigger order, so the start index never moves back
        while cursor < ticks.len() && ticks[cursor].timestamp < t0 {
            cursor += 1;
        }

        let window: Vec<f64> = ticks[cursor..]
            .iter()
            .take_while(|tick| tick.timestamp <= t1)
            .map(|tick| tick.price)
            .collect();
        let (Some(&entry_price), Some(&exit_price)) = (window.first(), window.last()) else {
            continue;
        };

        let max = window.iter().copied().fold(entry_price, f64::max);
        let min = window.iter().copied().fold(entry_price, f64::min);
        let excursion = |price: f64| (price - entry_price) / entry_price;
        let (mfe, mae) = if event.direction < 0 {
            (excursion(min), excursion(max))
        } else {
            (excursion(max), excursion(min))
        };

        outcomes.push(SweepOutcome {
            direction: event.direction,
            ts_end: t0,
            entry_price,
            ret: excursion(exit_price),
            mfe,
            mae,
            volume_total: event.volume_total,
        });
    }

    outcomes
}

/// Distribution statistics for a set of returns.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ReturnSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub median: f64,
    pub p5: f64,
    pub p95: f64,
}

impl ReturnSummary {
    /// `None` for an empty slice.
    pub fn from_returns(returns: &[f64]) -> Option<Self> {
        if returns.is_empty() {
            return None;
        }
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = returns.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count: returns.len(),
            mean,
            std: variance.sqrt(),
            median: percentile(&sorted, 50.0),
            p5: percentile(&sorted, 5.0),
            p95: percentile(&sorted, 95.0),
        })
    }
}

/// Linear-interpolated percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Forward-return summaries split by sweep direction.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AnalysisReport {
    pub up_count: usize,
    pub down_count: usize,
    pub up: Option<ReturnSummary>,
    pub down: Option<ReturnSummary>,
}

pub fn summarize(outcomes: &[SweepOutcome]) -> AnalysisReport {
    let (up, down): (Vec<&SweepOutcome>, Vec<&SweepOutcome>) =
        outcomes.iter().filter(|o| o.direction != 0).partition(|o| o.direction > 0);
    let up_returns: Vec<f64> = up.iter().map(|o| o.ret).collect();
    let down_returns: Vec<f64> = down.iter().map(|o| o.ret).collect();

    AnalysisReport {
        up_count: up_returns.len(),
        down_count: down_returns.len(),
        up: ReturnSummary::from_returns(&up_returns),
        down: ReturnSummary::from_returns(&down_returns),
    }
}
