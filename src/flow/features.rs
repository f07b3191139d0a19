//! Order-flow feature extraction.
//!
//! Trades feed a 10s volume window and a short run of one-second aggregation
//! buckets; book messages maintain an [`OrderBook`]. [`OrderFlowFeatureExtractor::frame`]
//! folds everything into an [`OrderFlowFrame`] at a given timestamp.

use std::collections::VecDeque;

use tracing::debug;

use super::order_book::OrderBook;
use super::rolling_extreme::RollingExtreme;
use super::window::VolumeWindow;
use crate::logging::targets;
use crate::types::{AggRunDir, BookLevel, OrderFlowFrame, Side, WeakSide};

/// Longest volume horizon reported in a frame.
const TRADE_WINDOW_SEC: f64 = 10.0;

/// Buckets older than this many seconds behind the newest are dropped.
const BUCKET_RETENTION_SEC: i64 = 5;

/// Buckets inspected for an aggressor run.
const RUN_LENGTH: usize = 3;

/// Minimum one-sided share for a bucket to count toward a run.
const RUN_SHARE: f64 = 0.7;

/// A side is weak when its near-touch depth is below this fraction of the other.
const WEAK_SIDE_FRACTION: f64 = 0.4;

const VOLUME_HORIZONS: [f64; 3] = [1.0, 3.0, 10.0];
const DEPTH_BANDS: [f64; 3] = [0.001, 0.003, 0.005];

/// Buy and sell volume traded within one calendar second.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AggBucket {
    second: i64,
    buy_volume: f64,
    sell_volume: f64,
}

impl AggBucket {
    fn net(&self) -> f64 {
        self.buy_volume - self.sell_volume
    }

    fn direction(&self) -> AggRunDir {
        let total = self.buy_volume + self.sell_volume;
        if total <= 0.0 {
            return AggRunDir::None;
        }
        let share = self.buy_volume / total;
        let net = self.net();
        if net > 0.0 && share >= RUN_SHARE {
            AggRunDir::Buy
        } else if net < 0.0 && share <= 1.0 - RUN_SHARE {
            AggRunDir::Sell
        } else {
            AggRunDir::None
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderFlowFeatureExtractor {
    trades: VolumeWindow,
    buckets: VecDeque<AggBucket>,
    book: OrderBook,
    highlow_20s: RollingExtreme,
    highlow_30s: RollingExtreme,
    agg_run_dir: AggRunDir,
    last_price: f64,
    last_trade_ts: f64,
}

impl Default for OrderFlowFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderFlowFeatureExtractor {
    pub fn new() -> Self {
        Self {
            trades: VolumeWindow::new(TRADE_WINDOW_SEC),
            buckets: VecDeque::with_capacity(8),
            book: OrderBook::new(),
            highlow_20s: RollingExtreme::new(20.0),
            highlow_30s: RollingExtreme::new(30.0),
            agg_run_dir: AggRunDir::None,
            last_price: 0.0,
            last_trade_ts: 0.0,
        }
    }

    /// Ingest one trade print.
    pub fn add_trade(&mut self, ts: f64, price: f64, volume: f64, side: Side) {
        self.last_price = price;
        self.last_trade_ts = ts;
        self.trades.push(ts, volume, side);
        self.prune(ts);
        self.update_bucket(ts, volume, side);
        self.refresh_agg_run();
    }

    /// Replace the book with a full snapshot.
    pub fn apply_l2_snapshot(&mut self, bids: &[BookLevel], asks: &[BookLevel]) {
        self.book.apply_snapshot(bids, asks);
        debug!(
            target: targets::FEATURES,
            bid_levels = self.book.bid_levels(),
            ask_levels = self.book.ask_levels(),
            "book snapshot applied"
        );
    }

    /// Apply incremental level updates. Size <= 0 removes a level.
    pub fn apply_l2_delta(&mut self, bids: &[BookLevel], asks: &[BookLevel]) {
        self.book.apply_delta(bids, asks);
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn agg_run_dir(&self) -> AggRunDir {
        self.agg_run_dir
    }

    pub fn last_trade_ts(&self) -> f64 {
        self.last_trade_ts
    }

    /// Compute a feature snapshot at `ts_now`; `ts_now <= 0` means the last
    /// trade timestamp.
    ///
    /// Not a pure read: the mid is fed into the breakout extremes, so calling
    /// this twice at the same timestamp compares the mid against itself.
    pub fn frame(&mut self, ts_now: f64) -> OrderFlowFrame {
        let ts_now = if ts_now <= 0.0 { self.last_trade_ts } else { ts_now };

        self.prune(ts_now);
        self.refresh_agg_run();

        let mut frame = OrderFlowFrame {
            ts: ts_now,
            agg_run_dir: self.agg_run_dir,
            ..OrderFlowFrame::default()
        };

        let [(buy_1s, sell_1s), (buy_3s, sell_3s), (buy_10s, sell_10s)] =
            VOLUME_HORIZONS.map(|horizon| self.volume_within(ts_now, horizon));
        frame.buy_vol_1s = buy_1s;
        frame.sell_vol_1s = sell_1s;
        frame.buy_vol_3s = buy_3s;
        frame.sell_vol_3s = sell_3s;
        frame.buy_vol_10s = buy_10s;
        frame.sell_vol_10s = sell_10s;

        (frame.buy_share_1s, frame.sell_share_1s) = shares(buy_1s, sell_1s);
        (frame.buy_share_3s, frame.sell_share_3s) = shares(buy_3s, sell_3s);
        (frame.buy_share_10s, frame.sell_share_10s) = shares(buy_10s, sell_10s);

        frame.best_bid = self.book.best_bid();
        frame.best_ask = self.book.best_ask();
        frame.mid = self.book.mid().unwrap_or(self.last_price);

        if frame.mid > 0.0 {
            let [d01, d03, d05] = DEPTH_BANDS.map(|pct| self.book.depth_within(frame.mid, pct));
            (frame.liq01_bid, frame.liq01_ask) = d01;
            (frame.liq03_bid, frame.liq03_ask) = d03;
            (frame.liq05_bid, frame.liq05_ask) = d05;
        }

        frame.weak_side_01 = weak_side(frame.liq01_bid, frame.liq01_ask);

        if frame.mid > 0.0 {
            (frame.is_new_high_20s, frame.is_new_low_20s) =
                breakout(&mut self.highlow_20s, ts_now, frame.mid);
            (frame.is_new_high_30s, frame.is_new_low_30s) =
                breakout(&mut self.highlow_30s, ts_now, frame.mid);
        }

        frame
    }

    /// Buy and sell volume of trades aged within `[0, horizon]` at `ts_now`.
    fn volume_within(&self, ts_now: f64, horizon: f64) -> (f64, f64) {
        self.trades
            .iter()
            .filter(|trade| {
                let age = ts_now - trade.ts;
                (0.0..=horizon).contains(&age)
            })
            .fold((0.0, 0.0), |(buy, sell), trade| match trade.side {
                Side::Buy => (buy + trade.volume, sell),
                Side::Sell => (buy, sell + trade.volume),
            })
    }

    fn prune(&mut self, ts_now: f64) {
        self.trades.evict_before(ts_now - TRADE_WINDOW_SEC);
        self.prune_buckets(ts_now.floor() as i64);
    }

    fn prune_buckets(&mut self, second: i64) {
        let cutoff = second - BUCKET_RETENTION_SEC;
        while self.buckets.front().is_some_and(|b| b.second < cutoff) {
            self.buckets.pop_front();
        }
    }

    fn update_bucket(&mut self, ts: f64, volume: f64, side: Side) {
        let second = ts.floor() as i64;
        if self.buckets.back().map_or(true, |b| b.second != second) {
            self.buckets.push_back(AggBucket {
                second,
                buy_volume: 0.0,
                sell_volume: 0.0,
            });
        }
        if let Some(bucket) = self.buckets.back_mut() {
            match side {
                Side::Buy => bucket.buy_volume += volume,
                Side::Sell => bucket.sell_volume += volume,
            }
        }
        self.prune_buckets(second);
    }

    /// A run needs the three newest buckets to agree on a direction with
    /// non-decreasing absolute imbalance, oldest to newest.
    fn refresh_agg_run(&mut self) {
        self.agg_run_dir = AggRunDir::None;
        if self.buckets.len() < RUN_LENGTH {
            return;
        }

        let start = self.buckets.len() - RUN_LENGTH;
        let recent: Vec<AggBucket> = self.buckets.range(start..).copied().collect();
        let direction = recent[0].direction();
        if direction == AggRunDir::None || recent.iter().any(|b| b.direction() != direction) {
            return;
        }

        let strengthening = recent
            .windows(2)
            .all(|pair| pair[0].net().abs() <= pair[1].net().abs());
        if strengthening {
            self.agg_run_dir = direction;
        }
    }
}

/// `(buy_share, sell_share)`, both zero when nothing traded.
fn shares(buy: f64, sell: f64) -> (f64, f64) {
    let total = buy + sell;
    if total <= 0.0 {
        return (0.0, 0.0);
    }
    let buy_share = buy / total;
    (buy_share, 1.0 - buy_share)
}

fn weak_side(bid_depth: f64, ask_depth: f64) -> WeakSide {
    if bid_depth <= 0.0 || ask_depth <= 0.0 {
        return WeakSide::None;
    }
    if bid_depth < WEAK_SIDE_FRACTION * ask_depth {
        WeakSide::Bid
    } else if ask_depth < WEAK_SIDE_FRACTION * bid_depth {
        WeakSide::Ask
    } else {
        WeakSide::None
    }
}

/// Record `mid` and report whether it sits at the window high and low.
fn breakout(extreme: &mut RollingExtreme, ts: f64, mid: f64) -> (bool, bool) {
    extreme.add(ts, mid);
    let is_high = extreme.current_max().is_some_and(|max| mid >= max);
    let is_low = extreme.current_min().is_some_and(|min| mid <= min);
    (is_high, is_low)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(buy: f64, sell: f64) -> AggBucket {
        AggBucket {
            second: 0,
            buy_volume: buy,
            sell_volume: sell,
        }
    }

    #[test]
    fn test_bucket_direction() {
        assert_eq!(bucket(7.0, 3.0).direction(), AggRunDir::Buy);
        assert_eq!(bucket(6.0, 4.0).direction(), AggRunDir::None);
        assert_eq!(bucket(3.0, 7.0).direction(), AggRunDir::Sell);
        assert_eq!(bucket(0.0, 0.0).direction(), AggRunDir::None);
        assert_eq!(bucket(5.0, 5.0).direction(), AggRunDir::None);
    }

    #[test]
    fn test_shares() {
        assert_eq!(shares(0.0, 0.0), (0.0, 0.0));
        assert_eq!(shares(3.0, 1.0), (0.75, 0.25));
        assert_eq!(shares(0.0, 2.0), (0.0, 1.0));
    }

    #[test]
    fn test_weak_side() {
        assert_eq!(weak_side(1.0, 3.0), WeakSide::Bid);
        assert_eq!(weak_side(3.0, 1.0), WeakSide::Ask);
        assert_eq!(weak_side(2.0, 3.0), WeakSide::None);
        assert_eq!(weak_side(0.0, 3.0), WeakSide::None);
        assert_eq!(weak_side(3.0, 0.0), WeakSide::None);
    }

    #[test]
    fn test_empty_frame() {
        let mut extractor = OrderFlowFeatureExtractor::new();
        let frame = extractor.frame(0.0);
        assert_eq!(frame, OrderFlowFrame::default());
    }

    #[test]
    fn test_frame_defaults_to_last_trade_ts() {
        let mut extractor = OrderFlowFeatureExtractor::new();
        extractor.add_trade(100.25, 50.0, 1.0, Side::Buy);
        let frame = extractor.frame(0.0);
        assert_eq!(frame.ts, 100.25);
        // No book: mid falls back to the last trade price
        assert_eq!(frame.mid, 50.0);
        assert_eq!(frame.best_bid, 0.0);
        assert_eq!(frame.buy_vol_1s, 1.0);
        assert_eq!(frame.buy_share_1s, 1.0);
        assert_eq!(frame.sell_share_1s, 0.0);
    }

    #[test]
    fn test_volume_horizons() {
        let mut extractor = OrderFlowFeatureExtractor::new();
        extractor.add_trade(90.0, 100.0, 8.0, Side::Buy); // age 10: 10s only
        extractor.add_trade(97.5, 100.0, 4.0, Side::Sell); // age 2.5: 3s and 10s
        extractor.add_trade(99.5, 100.0, 2.0, Side::Buy); // age 0.5: all
        extractor.add_trade(99.75, 100.0, 1.0, Side::Sell);

        let frame = extractor.frame(100.0);
        assert_eq!((frame.buy_vol_1s, frame.sell_vol_1s), (2.0, 1.0));
        assert_eq!((frame.buy_vol_3s, frame.sell_vol_3s), (2.0, 5.0));
        assert_eq!((frame.buy_vol_10s, frame.sell_vol_10s), (10.0, 5.0));
        assert!((frame.buy_share_10s - 10.0 / 15.0).abs() < 1e-12);
        assert!((frame.buy_share_10s + frame.sell_share_10s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_future_trades_are_ignored() {
        let mut extractor = OrderFlowFeatureExtractor::new();
        extractor.add_trade(10.0, 100.0, 1.0, Side::Buy);
        extractor.add_trade(12.0, 100.0, 5.0, Side::Buy);
        let frame = extractor.frame(11.0);
        assert_eq!(frame.buy_vol_10s, 1.0);
    }

    #[test]
    fn test_buckets_keep_last_six_seconds() {
        let mut extractor = OrderFlowFeatureExtractor::new();
        for second in 0..10 {
            extractor.add_trade(second as f64 + 0.5, 100.0, 1.0, Side::Buy);
        }
        let seconds: Vec<i64> = extractor.buckets.iter().map(|b| b.second).collect();
        assert_eq!(seconds, vec![4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_same_second_accumulates() {
        let mut extractor = OrderFlowFeatureExtractor::new();
        extractor.add_trade(5.1, 100.0, 1.0, Side::Buy);
        extractor.add_trade(5.9, 100.0, 2.0, Side::Sell);
        assert_eq!(extractor.buckets.len(), 1);
        assert_eq!(
            extractor.buckets[0],
            AggBucket {
                second: 5,
                buy_volume: 1.0,
                sell_volume: 2.0,
            }
        );
    }
}
