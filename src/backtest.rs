//! Tick replay through the sweep detector and strategy.
//!
//! Per tick: run the detector; on a signal hand the sweep to the strategy;
//! then always let the strategy manage its position at the tick price.
//! PnL is marked in price units per unit size.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::flow::SweepModel;
use crate::logging::targets;
use crate::strategy::MeanReversionStrategy;
use crate::types::{StrategyAction, StrategyActionType, Tick};

/// Actions produced by one tick: at most one from a sweep and one from
/// position management.
pub type TickActions = SmallVec<[StrategyAction; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct BacktestReport {
    pub ticks: u64,
    pub sweeps: u64,
    pub opens: u64,
    pub closes: u64,
    pub wins: u64,
    pub losses: u64,
    pub cum_pnl: f64,
}

impl BacktestReport {
    /// Winning share of decided trades in percent, 0 when none were decided.
    pub fn win_rate(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            return 0.0;
        }
        self.wins as f64 / decided as f64 * 100.0
    }
}

/// Host-side view of the open trade, for PnL.
#[derive(Debug, Clone, Copy)]
struct OpenTrade {
    dir: i8,
    entry_price: f64,
}

#[derive(Debug, Clone)]
pub struct Backtester {
    model: SweepModel,
    strategy: MeanReversionStrategy,
    open: Option<OpenTrade>,
    report: BacktestReport,
}

impl Backtester {
    pub fn new(model: SweepModel, strategy: MeanReversionStrategy) -> Self {
        Self {
            model,
            strategy,
            open: None,
            report: BacktestReport::default(),
        }
    }

    pub fn on_tick(&mut self, tick: &Tick) -> TickActions {
        let mut actions = TickActions::new();
        self.report.ticks += 1;

        if self.model.process_tick(tick).is_signal() {
            self.report.sweeps += 1;
            let action = self.strategy.on_sweep(&self.model.last_event());
            self.book(&action);
            if !action.is_idle() {
                actions.push(action);
            }
        }

        let action = self.strategy.on_tick(tick.timestamp, tick.price);
        self.book(&action);
        if !action.is_idle() {
            actions.push(action);
        }

        actions
    }

    fn book(&mut self, action: &StrategyAction) {
        match action.action_type {
            StrategyActionType::OpenLong | StrategyActionType::OpenShort => {
                self.open = Some(OpenTrade {
                    dir: action.dir,
                    entry_price: action.price,
                });
                self.report.opens += 1;
            }
            StrategyActionType::Close => {
                let Some(open) = self.open.take() else {
                    return;
                };
                let pnl = (action.price - open.entry_price) * f64::from(open.dir);
                self.report.cum_pnl += pnl;
                if pnl > 0.0 {
                    self.report.wins += 1;
                } else if pnl < 0.0 {
                    self.report.losses += 1;
                }
                self.report.closes += 1;
                debug!(target: targets::REPLAY, pnl, cum_pnl = self.report.cum_pnl, "trade booked");
            }
            StrategyActionType::Idle => {}
        }
    }

    /// Replay every tick and return the cumulative report.
    pub fn run(&mut self, ticks: &[Tick]) -> BacktestReport {
        for tick in ticks {
            self.on_tick(tick);
        }
        self.finish()
    }

    /// Report so far. An open position is left unmarked.
    pub fn finish(&self) -> BacktestReport {
        info!(
            target: targets::REPLAY,
            ticks = self.report.ticks,
            sweeps = self.report.sweeps,
            opens = self.report.opens,
            closes = self.report.closes,
            win_rate = self.report.win_rate(),
            cum_pnl = self.report.cum_pnl,
            "backtest complete"
        );
        self.report
    }

    pub fn report(&self) -> &BacktestReport {
        &self.report
    }

    pub fn strategy(&self) -> &MeanReversionStrategy {
        &self.strategy
    }
}
