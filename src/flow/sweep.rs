//! Liquidity sweep detector.
//!
//! Compares aggressive volume in a short burst window against the volume the
//! long baseline window would predict for the same span:
//!
//! ```text
//! expected_short = long_total / long_window * short_window
//! ratio          = short_total / expected_short
//! ```
//!
//! A sweep latches when `ratio >= threshold` and only re-arms once the ratio
//! falls below `threshold / 2`, so a single burst fires at most once.

use tracing::{debug, trace};

use super::window::VolumeWindow;
use crate::config::SweepConfig;
use crate::errors::Result;
use crate::logging::targets;
use crate::types::{SweepEvent, SweepSignal, Tick};

/// Short-window dominance needed to assign a direction to a burst.
const DOMINANCE_RATIO: f64 = 1.5;

/// Fraction of the threshold below which a latched detector re-arms.
const REARM_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatchState {
    Armed,
    Latched,
}

#[derive(Debug, Clone)]
pub struct SweepModel {
    config: SweepConfig,
    short: VolumeWindow,
    long: VolumeWindow,
    state: LatchState,
    last_sweep_ts: Option<f64>,
    last_price: Option<f64>,
    last_ratio: f64,
    last_event: SweepEvent,
}

impl SweepModel {
    /// Create a detector. Fails unless `0 < short_window_sec < long_window_sec`
    /// and `threshold_ratio > 0`.
    pub fn new(short_window_sec: f64, long_window_sec: f64, threshold_ratio: f64) -> Result<Self> {
        Self::from_config(&SweepConfig::new(
            short_window_sec,
            long_window_sec,
            threshold_ratio,
        ))
    }

    pub fn from_config(config: &SweepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config.clone()))
    }

    fn build(config: SweepConfig) -> Self {
        Self {
            short: VolumeWindow::new(config.short_window_sec),
            long: VolumeWindow::new(config.long_window_sec),
            config,
            state: LatchState::Armed,
            last_sweep_ts: None,
            last_price: None,
            last_ratio: 0.0,
            last_event: SweepEvent::default(),
        }
    }

    /// Feed one tick. Returns a directional signal only on the tick that latches.
    pub fn process_tick(&mut self, tick: &Tick) -> SweepSignal {
        let signal = self.evaluate(tick);
        self.last_price = Some(tick.price);
        signal
    }

    fn evaluate(&mut self, tick: &Tick) -> SweepSignal {
        let ts = tick.timestamp;

        self.short.evict_expired(ts);
        self.long.evict_expired(ts);
        self.short.push(ts, tick.volume, tick.side);
        self.long.push(ts, tick.volume, tick.side);

        let short_total = self.short.total_volume();
        let long_total = self.long.total_volume();
        if long_total <= 0.0 {
            return SweepSignal::NoSignal;
        }

        let expected_short = long_total / self.long.window_sec() * self.short.window_sec();
        if expected_short <= 0.0 {
            return SweepSignal::NoSignal;
        }

        let ratio = short_total / expected_short;
        self.last_ratio = ratio;
        trace!(target: targets::SWEEP, ts, ratio, short_total, long_total, "burst ratio");

        let threshold = self.config.threshold_ratio;
        match self.state {
            LatchState::Latched => {
                if ratio < threshold * REARM_FRACTION {
                    self.state = LatchState::Armed;
                    debug!(target: targets::SWEEP, ts, ratio, "sweep detector re-armed");
                }
                SweepSignal::NoSignal
            }
            LatchState::Armed if ratio >= threshold => {
                self.state = LatchState::Latched;
                self.last_sweep_ts = Some(ts);
                self.on_latch(tick, ratio)
            }
            LatchState::Armed => SweepSignal::NoSignal,
        }
    }

    /// Classify a fresh latch by short-window dominance and record the event.
    fn on_latch(&mut self, tick: &Tick, ratio: f64) -> SweepSignal {
        let buy = self.short.buy_volume();
        let sell = self.short.sell_volume();

        let (signal, direction) = if buy > sell * DOMINANCE_RATIO {
            (SweepSignal::UpSweep, 1)
        } else if sell > buy * DOMINANCE_RATIO {
            (SweepSignal::DownSweep, -1)
        } else {
            // Balanced burst: the latch is consumed but nothing is reported
            debug!(
                target: targets::SWEEP,
                ts = tick.timestamp,
                ratio,
                buy,
                sell,
                "sweep latched without dominant side"
            );
            return SweepSignal::NoSignal;
        };

        self.last_event = SweepEvent {
            ts_start: tick.timestamp - self.short.window_sec(),
            ts_end: tick.timestamp,
            price_start: self.last_price.unwrap_or(tick.price),
            price_end: tick.price,
            volume_total: self.short.total_volume(),
            direction,
        };
        debug!(
            target: targets::SWEEP,
            ts = tick.timestamp,
            ratio,
            direction,
            price = tick.price,
            volume = self.last_event.volume_total,
            "sweep detected"
        );
        signal
    }

    /// Most recent directional sweep. `direction == 0` until the first one fires.
    pub fn last_event(&self) -> SweepEvent {
        self.last_event
    }

    /// Trigger time of the most recent latch, directional or not.
    pub fn last_sweep_ts(&self) -> Option<f64> {
        self.last_sweep_ts
    }

    /// Burst ratio computed on the last tick with a positive baseline.
    pub fn last_ratio(&self) -> f64 {
        self.last_ratio
    }

    pub fn is_latched(&self) -> bool {
        self.state == LatchState::Latched
    }

    /// Buy and sell volume currently in the burst window.
    pub fn short_volumes(&self) -> (f64, f64) {
        (self.short.buy_volume(), self.short.sell_volume())
    }

    /// Buy and sell volume currently in the baseline window.
    pub fn long_volumes(&self) -> (f64, f64) {
        (self.long.buy_volume(), self.long.sell_volume())
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Clear all windows and state, keeping the configuration.
    pub fn reset(&mut self) {
        self.short.clear();
        self.long.clear();
        self.state = LatchState::Armed;
        self.last_sweep_ts = None;
        self.last_price = None;
        self.last_ratio = 0.0;
        self.last_event = SweepEvent::default();
    }
}

impl Default for SweepModel {
    fn default() -> Self {
        Self::build(SweepConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::types::Side;

    fn model() -> SweepModel {
        SweepModel::new(0.3, 10.0, 3.0).unwrap()
    }

    #[test]
    fn test_rejects_invalid_windows() {
        assert!(matches!(
            SweepModel::new(10.0, 0.3, 3.0),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(SweepModel::new(0.3, 0.3, 3.0).is_err());
        assert!(SweepModel::new(-0.1, 10.0, 3.0).is_err());
        assert!(SweepModel::new(0.3, 10.0, 0.0).is_err());
    }

    #[test]
    fn test_zero_volume_never_signals() {
        let mut model = model();
        for i in 0..100 {
            let tick = Tick::buy(i as f64 * 0.01, 100.0, 0.0);
            assert_eq!(model.process_tick(&tick), SweepSignal::NoSignal);
        }
        assert!(!model.is_latched());
        assert_eq!(model.last_event().direction, 0);
    }

    #[test]
    fn test_first_tick_ratio_is_window_ratio() {
        let mut model = model();
        let signal = model.process_tick(&Tick::sell(5.0, 100.0, 2.0));
        assert_eq!(signal, SweepSignal::DownSweep);
        assert!((model.last_ratio() - 10.0 / 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_event_fields_on_detection() {
        let mut model = model();
        let signal = model.process_tick(&Tick::buy(100.0, 2000.5, 3.0));
        assert_eq!(signal, SweepSignal::UpSweep);

        let event = model.last_event();
        assert_eq!(event.direction, 1);
        assert_eq!(event.ts_end, 100.0);
        assert!((event.ts_start - 99.7).abs() < 1e-9);
        // No earlier tick: start price falls back to the trigger price
        assert_eq!(event.price_start, 2000.5);
        assert_eq!(event.price_end, 2000.5);
        assert_eq!(event.volume_total, 3.0);
        assert_eq!(model.last_sweep_ts(), Some(100.0));
    }

    #[test]
    fn test_price_start_uses_previous_tick() {
        let mut model = model();
        // Zero-volume ticks establish a price without building a baseline
        model.process_tick(&Tick::buy(0.0, 99.0, 0.0));
        model.process_tick(&Tick::buy(0.1, 99.5, 0.0));
        let signal = model.process_tick(&Tick::buy(0.2, 101.0, 4.0));
        assert_eq!(signal, SweepSignal::UpSweep);
        assert_eq!(model.last_event().price_start, 99.5);
        assert_eq!(model.last_event().price_end, 101.0);
    }

    #[test]
    fn test_balanced_burst_consumes_latch_without_event() {
        let mut model = model();
        // Seed a buy into both windows without evaluating it
        model.short.push(0.0, 1.0, Side::Buy);
        model.long.push(0.0, 1.0, Side::Buy);

        // Buy 1.0 vs sell 1.0 in the burst window: neither side dominates
        let signal = model.process_tick(&Tick::sell(0.01, 100.0, 1.0));
        assert_eq!(signal, SweepSignal::NoSignal);
        assert!(model.is_latched());
        assert_eq!(model.last_sweep_ts(), Some(0.01));
        assert_eq!(model.last_event().direction, 0);
    }

    #[test]
    fn test_latched_does_not_refire() {
        let mut model = model();
        assert_eq!(model.process_tick(&Tick::buy(0.0, 100.0, 1.0)), SweepSignal::UpSweep);
        for i in 1..50 {
            let tick = Tick::buy(i as f64 * 0.02, 100.0, 1.0);
            assert_eq!(model.process_tick(&tick), SweepSignal::NoSignal);
        }
        assert!(model.is_latched());
    }

    #[test]
    fn test_residue_after_expiry_never_signals() {
        let mut model = model();
        assert_eq!(model.process_tick(&Tick::buy(0.0, 100.0, 0.1)), SweepSignal::UpSweep);
        model.process_tick(&Tick::buy(0.01, 100.0, 0.2));

        // Zero-volume trades keep both queues non-empty past the baseline expiry
        for i in 0..150 {
            let tick = Tick::buy(0.02 + i as f64 * 0.1, 100.0, 0.0);
            assert_eq!(model.process_tick(&tick), SweepSignal::NoSignal, "ts {}", tick.timestamp);
        }
        assert_eq!(model.short_volumes(), (0.0, 0.0));
        assert_eq!(model.long_volumes(), (0.0, 0.0));
        assert_eq!(model.last_sweep_ts(), Some(0.0));
    }

    #[test]
    fn test_rearm_requires_half_threshold() {
        let mut model = model();
        assert_eq!(model.process_tick(&Tick::buy(0.0, 100.0, 1.0)), SweepSignal::UpSweep);

        // 0.064 / (1.064 * 0.03) ~= 2.0: below threshold, above half of it
        assert_eq!(model.process_tick(&Tick::buy(0.5, 100.0, 0.064)), SweepSignal::NoSignal);
        assert!(model.last_ratio() >= 1.5 && model.last_ratio() < 3.0);
        assert!(model.is_latched());

        // Back above threshold while still latched
        assert_eq!(model.process_tick(&Tick::buy(1.0, 100.0, 0.5)), SweepSignal::NoSignal);
        assert!(model.last_ratio() >= 3.0);
        assert!(model.is_latched());

        // Empty burst window drops the ratio to zero and re-arms
        assert_eq!(model.process_tick(&Tick::buy(2.0, 100.0, 0.0)), SweepSignal::NoSignal);
        assert_eq!(model.last_ratio(), 0.0);
        assert!(!model.is_latched());

        assert_eq!(model.process_tick(&Tick::sell(3.0, 99.0, 1.0)), SweepSignal::DownSweep);
        assert_eq!(model.last_sweep_ts(), Some(3.0));
        assert_eq!(model.last_event().direction, -1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut model = model();
        model.process_tick(&Tick::buy(0.0, 100.0, 1.0));
        assert!(model.is_latched());
        model.reset();
        assert!(!model.is_latched());
        assert_eq!(model.short_volumes(), (0.0, 0.0));
        assert_eq!(model.long_volumes(), (0.0, 0.0));
        assert_eq!(model.last_event(), SweepEvent::default());
    }

    #[test]
    fn test_default_matches_default_config() {
        let model = SweepModel::default();
        assert_eq!(model.config(), &SweepConfig::default());
    }
}
