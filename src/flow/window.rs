//! Time-bounded trade queue with running buy/sell totals.

use std::collections::VecDeque;

use crate::types::Side;

/// One trade held in a [`VolumeWindow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WindowEntry {
    pub(crate) ts: f64,
    pub(crate) volume: f64,
    pub(crate) side: Side,
}

/// Trailing window of trades with buy/sell totals kept in sync with eviction.
///
/// Every queue that needs "volume over the last N seconds" owns one of these
/// and evicts it independently; totals are never derived from another window.
///
/// A side's total is exactly 0.0 whenever the queue holds no non-zero volume
/// on that side, so subtraction residue never outlives the trades it came from.
#[derive(Debug, Clone)]
pub(crate) struct VolumeWindow {
    window_sec: f64,
    entries: VecDeque<WindowEntry>,
    buy_volume: f64,
    sell_volume: f64,
    buy_count: usize,
    sell_count: usize,
}

impl VolumeWindow {
    pub(crate) fn new(window_sec: f64) -> Self {
        Self {
            window_sec,
            entries: VecDeque::with_capacity(1000),
            buy_volume: 0.0,
            sell_volume: 0.0,
            buy_count: 0,
            sell_count: 0,
        }
    }

    pub(crate) fn push(&mut self, ts: f64, volume: f64, side: Side) {
        self.entries.push_back(WindowEntry { ts, volume, side });
        if volume == 0.0 {
            return;
        }
        match side {
            Side::Buy => {
                self.buy_volume += volume;
                self.buy_count += 1;
            }
            Side::Sell => {
                self.sell_volume += volume;
                self.sell_count += 1;
            }
        }
    }

    /// Drop entries whose age at `ts_now` exceeds the window.
    pub(crate) fn evict_expired(&mut self, ts_now: f64) {
        let window_sec = self.window_sec;
        self.evict_while(|entry| ts_now - entry.ts > window_sec);
    }

    /// Drop entries stamped strictly before `cutoff`.
    pub(crate) fn evict_before(&mut self, cutoff: f64) {
        self.evict_while(|entry| entry.ts < cutoff);
    }

    fn evict_while(&mut self, expired: impl Fn(&WindowEntry) -> bool) {
        while let Some(front) = self.entries.front() {
            if !expired(front) {
                break;
            }
            if front.volume != 0.0 {
                match front.side {
                    Side::Buy => {
                        self.buy_volume -= front.volume;
                        self.buy_count -= 1;
                    }
                    Side::Sell => {
                        self.sell_volume -= front.volume;
                        self.sell_count -= 1;
                    }
                }
            }
            self.entries.pop_front();
        }
        if self.buy_count == 0 {
            self.buy_volume = 0.0;
        }
        if self.sell_count == 0 {
            self.sell_volume = 0.0;
        }
    }

    pub(crate) fn buy_volume(&self) -> f64 {
        self.buy_volume
    }

    pub(crate) fn sell_volume(&self) -> f64 {
        self.sell_volume
    }

    pub(crate) fn total_volume(&self) -> f64 {
        self.buy_volume + self.sell_volume
    }

    pub(crate) fn window_sec(&self) -> f64 {
        self.window_sec
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &WindowEntry> {
        self.entries.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.buy_volume = 0.0;
        self.sell_volume = 0.0;
        self.buy_count = 0;
        self.sell_count = 0;
    }
}
