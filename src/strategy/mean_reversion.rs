//! Sweep-fading mean-reversion strategy.
//!
//! Flat until a directional sweep arrives, then enters against it after a
//! fixed delay: an up-sweep opens a short, a down-sweep opens a long. An open
//! position closes on take-profit, stop-loss, max holding time, or a fresh
//! sweep that continues against it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::StrategyConfig;
use crate::errors::Result;
use crate::logging::targets;
use crate::types::{Position, PositionDirection, StrategyAction, SweepEvent};

const BPS: f64 = 10_000.0;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    MaxHold,
    /// A new sweep moving against the position
    AdverseSweep,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::MaxHold => "max_hold",
            ExitReason::AdverseSweep => "adverse_sweep",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeanReversionStrategy {
    config: StrategyConfig,
    position: Option<Position>,
    last_exit: Option<ExitReason>,
}

impl MeanReversionStrategy {
    pub fn new(delay_ms: f64, hold_sec: f64, tp_bp: f64, sl_bp: f64) -> Result<Self> {
        Self::from_config(&StrategyConfig::new(delay_ms, hold_sec, tp_bp, sl_bp))
    }

    pub fn from_config(config: &StrategyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config.clone()))
    }

    fn build(config: StrategyConfig) -> Self {
        Self {
            config,
            position: None,
            last_exit: None,
        }
    }

    /// React to a sweep event.
    ///
    /// While flat this opens a fading position timed `delay_ms` after the
    /// sweep. While in a position, a sweep whose direction is the negated
    /// position sign closes it; anything else is idle.
    pub fn on_sweep(&mut self, event: &SweepEvent) -> StrategyAction {
        if let Some(position) = self.position {
            let adverse = event.direction != 0 && event.direction == -position.direction.sign();
            if adverse {
                return self.close(ExitReason::AdverseSweep, event.price_end, event.ts_end);
            }
            return StrategyAction::idle();
        }

        // Flat-path actions carry the entry time even when nothing opens
        let entry_ts = event.ts_end + self.config.delay_ms / 1000.0;
        let direction = match event.direction {
            d if d > 0 => PositionDirection::Short,
            d if d < 0 => PositionDirection::Long,
            _ => return StrategyAction::idle_at(entry_ts),
        };

        // Returns are measured relative to entry price
        if !(event.price_end.is_finite() && event.price_end > 0.0) {
            warn!(
                target: targets::STRATEGY,
                price = event.price_end,
                "ignoring sweep with non-positive price"
            );
            return StrategyAction::idle_at(entry_ts);
        }

        let position = Position {
            direction,
            entry_price: event.price_end,
            entry_ts,
        };
        self.position = Some(position);

        info!(
            target: targets::STRATEGY,
            direction = ?direction,
            price = position.entry_price,
            ts = entry_ts,
            "position opened"
        );
        StrategyAction::open(direction, position.entry_price, entry_ts)
    }

    /// Manage the open position against the latest trade price.
    ///
    /// Exit checks run in order: take-profit, stop-loss, max hold.
    pub fn on_tick(&mut self, ts: f64, price: f64) -> StrategyAction {
        let Some(position) = self.position else {
            return StrategyAction::idle();
        };

        let ret_bp = (price - position.entry_price) / position.entry_price * BPS;
        let signed_ret = ret_bp * f64::from(position.direction.sign());

        let reason = if signed_ret >= self.config.tp_bp {
            ExitReason::TakeProfit
        } else if signed_ret <= -self.config.sl_bp {
            ExitReason::StopLoss
        } else if ts - position.entry_ts >= self.config.hold_sec {
            ExitReason::MaxHold
        } else {
            return StrategyAction::idle();
        };

        self.close(reason, price, ts)
    }

    fn close(&mut self, reason: ExitReason, price: f64, ts: f64) -> StrategyAction {
        let Some(position) = self.position.take() else {
            return StrategyAction::idle();
        };
        self.last_exit = Some(reason);

        info!(
            target: targets::STRATEGY,
            reason = reason.as_str(),
            direction = ?position.direction,
            entry = position.entry_price,
            exit = price,
            held_sec = ts - position.entry_ts,
            "position closed"
        );
        StrategyAction::close(position.direction, price, ts)
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Reason for the most recent close, if any.
    pub fn last_exit(&self) -> Option<ExitReason> {
        self.last_exit
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Drop any open position without emitting a close.
    pub fn reset(&mut self) {
        self.position = None;
        self.last_exit = None;
    }
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self::build(StrategyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StrategyActionType;
    use proptest::prelude::*;

    fn up_sweep(ts_end: f64, price_end: f64) -> SweepEvent {
        SweepEvent {
            ts_start: ts_end - 0.3,
            ts_end,
            price_start: price_end,
            price_end,
            volume_total: 10.0,
            direction: 1,
        }
    }

    fn down_sweep(ts_end: f64, price_end: f64) -> SweepEvent {
        SweepEvent {
            direction: -1,
            ..up_sweep(ts_end, price_end)
        }
    }

    fn strategy() -> MeanReversionStrategy {
        MeanReversionStrategy::new(80.0, 5.0, 2.0, 2.0).unwrap()
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(MeanReversionStrategy::new(-1.0, 5.0, 2.0, 2.0).is_err());
        assert!(MeanReversionStrategy::new(80.0, 0.0, 2.0, 2.0).is_err());
        assert!(MeanReversionStrategy::new(80.0, 5.0, 0.0, 2.0).is_err());
        assert!(MeanReversionStrategy::new(80.0, 5.0, 2.0, -2.0).is_err());
    }

    #[test]
    fn test_up_sweep_opens_short_after_delay() {
        let mut strategy = strategy();
        let action = strategy.on_sweep(&up_sweep(100.0, 2000.0));

        assert_eq!(action.action_type, StrategyActionType::OpenShort);
        assert_eq!(action.dir, -1);
        assert_eq!(action.price, 2000.0);
        assert!((action.ts - 100.08).abs() < 1e-9);

        let position = strategy.position().unwrap();
        assert_eq!(position.direction, PositionDirection::Short);
        assert_eq!(position.entry_price, 2000.0);
    }

    #[test]
    fn test_down_sweep_opens_long() {
        let mut strategy = strategy();
        let action = strategy.on_sweep(&down_sweep(50.0, 1000.0));
        assert_eq!(action.action_type, StrategyActionType::OpenLong);
        assert_eq!(action.dir, 1);
    }

    #[test]
    fn test_directionless_event_is_idle() {
        let mut strategy = strategy();
        let action = strategy.on_sweep(&SweepEvent {
            direction: 0,
            ..up_sweep(10.0, 2000.0)
        });
        assert!(action.is_idle());
        assert_eq!(action.dir, 0);
        assert_eq!(action.price, 0.0);
        // Stamped with the delayed entry time
        assert!((action.ts - 10.08).abs() < 1e-9);
        assert!(strategy.is_flat());
    }

    #[test]
    fn test_non_positive_price_does_not_open() {
        let mut strategy = strategy();
        assert!(strategy.on_sweep(&up_sweep(1.0, 0.0)).is_idle());
        assert!(strategy.is_flat());
    }

    #[test]
    fn test_continuation_sweep_closes_short() {
        let mut strategy = strategy();
        strategy.on_sweep(&up_sweep(100.0, 2000.0));
        // The up move resumes against the short
        let action = strategy.on_sweep(&up_sweep(101.0, 2001.0));
        assert_eq!(action.action_type, StrategyActionType::Close);
        assert_eq!(action.dir, -1);
        assert_eq!(action.price, 2001.0);
        assert_eq!(action.ts, 101.0);
        assert_eq!(strategy.last_exit(), Some(ExitReason::AdverseSweep));
        assert!(strategy.is_flat());
    }

    #[test]
    fn test_continuation_sweep_closes_long() {
        let mut strategy = strategy();
        strategy.on_sweep(&down_sweep(100.0, 2000.0));
        let action = strategy.on_sweep(&down_sweep(101.0, 1990.0));
        assert_eq!(action.action_type, StrategyActionType::Close);
        assert_eq!(action.dir, 1);
        assert_eq!(action.price, 1990.0);
    }

    #[test]
    fn test_favourable_sweep_while_open_is_idle() {
        let mut strategy = strategy();
        strategy.on_sweep(&down_sweep(100.0, 2000.0));
        assert!(strategy.on_sweep(&up_sweep(102.0, 2003.0)).is_idle());
        assert!(strategy.on_sweep(&SweepEvent::default()).is_idle());
        assert_eq!(strategy.position().unwrap().entry_price, 2000.0);
    }

    #[test]
    fn test_long_take_profit() {
        let mut strategy = strategy();
        strategy.on_sweep(&down_sweep(100.0, 10_000.0));

        assert!(strategy.on_tick(100.5, 10_001.0).is_idle());
        let action = strategy.on_tick(101.0, 10_003.0);
        assert_eq!(action.action_type, StrategyActionType::Close);
        assert_eq!(action.dir, 1);
        assert_eq!(action.price, 10_003.0);
        assert_eq!(action.ts, 101.0);
        assert_eq!(strategy.last_exit(), Some(ExitReason::TakeProfit));
        assert!(strategy.is_flat());
    }

    #[test]
    fn test_short_stop_loss() {
        let mut strategy = strategy();
        strategy.on_sweep(&up_sweep(100.0, 10_000.0));
        let action = strategy.on_tick(100.2, 10_003.0);
        assert_eq!(action.action_type, StrategyActionType::Close);
        assert_eq!(action.dir, -1);
        assert_eq!(strategy.last_exit(), Some(ExitReason::StopLoss));
    }

    #[test]
    fn test_short_take_profit() {
        let mut strategy = strategy();
        strategy.on_sweep(&up_sweep(100.0, 10_000.0));
        strategy.on_tick(100.2, 9_997.0);
        assert_eq!(strategy.last_exit(), Some(ExitReason::TakeProfit));
    }

    #[test]
    fn test_max_hold_measured_from_delayed_entry() {
        let mut strategy = strategy();
        strategy.on_sweep(&down_sweep(100.0, 10_000.0));

        // Entry at 100.08, so 105.0 is not yet 5s
        assert!(strategy.on_tick(105.0, 10_000.0).is_idle());
        let action = strategy.on_tick(105.1, 10_000.0);
        assert_eq!(action.action_type, StrategyActionType::Close);
        assert_eq!(strategy.last_exit(), Some(ExitReason::MaxHold));
    }

    #[test]
    fn test_take_profit_wins_over_max_hold() {
        let mut strategy = strategy();
        strategy.on_sweep(&down_sweep(100.0, 10_000.0));
        strategy.on_tick(200.0, 10_010.0);
        assert_eq!(strategy.last_exit(), Some(ExitReason::TakeProfit));
    }

    #[test]
    fn test_flat_tick_is_idle() {
        let mut strategy = strategy();
        assert!(strategy.on_tick(1.0, 100.0).is_idle());
    }

    #[test]
    fn test_reopen_after_close() {
        let mut strategy = strategy();
        strategy.on_sweep(&down_sweep(100.0, 10_000.0));
        strategy.on_tick(101.0, 10_005.0);
        assert!(strategy.is_flat());

        let action = strategy.on_sweep(&up_sweep(110.0, 10_020.0));
        assert_eq!(action.action_type, StrategyActionType::OpenShort);
    }

    #[test]
    fn test_reset_drops_position() {
        let mut strategy = strategy();
        strategy.on_sweep(&down_sweep(100.0, 10_000.0));
        strategy.reset();
        assert!(strategy.is_flat());
        assert!(strategy.on_tick(200.0, 1.0).is_idle());
    }

    proptest! {
        #[test]
        fn long_closes_on_first_exit_condition(
            moves in prop::collection::vec((0.01f64..0.5, -3.0f64..3.0), 1..200),
        ) {
            let entry_price = 1000.0;
            let mut strategy = MeanReversionStrategy::new(0.0, 5.0, 2.0, 2.0).unwrap();
            strategy.on_sweep(&down_sweep(0.0, entry_price));

            let mut ts = 0.0;
            for (dt, bp) in moves {
                ts += dt;
                let price = entry_price * (1.0 + bp / BPS);
                let action = strategy.on_tick(ts, price);

                let ret_bp = (price - entry_price) / entry_price * BPS;
                let should_close = ret_bp >= 2.0 || ret_bp <= -2.0 || ts >= 5.0;
                prop_assert_eq!(action.action_type == StrategyActionType::Close, should_close);
                if should_close {
                    prop_assert_eq!(action.price, price);
                    prop_assert!(strategy.is_flat());
                    break;
                }
            }
        }
    }
}
