//! L2 order book rebuilt from snapshot and delta messages.
//!
//! Each side is a price-ordered map of price -> size. Sizes are always
//! strictly positive; an update with size <= 0 removes the level. Callers
//! walk a side through [`OrderBook::bids_best_first`] (descending) or
//! [`OrderBook::asks_best_first`] (ascending) rather than relying on the
//! map's native order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::BookLevel;

/// Total-ordered f64 key for the price maps.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriceKey(f64);

impl Eq for PriceKey {}

impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    bids: BTreeMap<PriceKey, f64>,
    asks: BTreeMap<PriceKey, f64>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both sides with the given levels.
    pub fn apply_snapshot(&mut self, bids: &[BookLevel], asks: &[BookLevel]) {
        self.bids.clear();
        self.asks.clear();
        Self::apply_levels(&mut self.bids, bids);
        Self::apply_levels(&mut self.asks, asks);
    }

    /// Mutate both sides in place.
    pub fn apply_delta(&mut self, bids: &[BookLevel], asks: &[BookLevel]) {
        Self::apply_levels(&mut self.bids, bids);
        Self::apply_levels(&mut self.asks, asks);
    }

    fn apply_levels(side: &mut BTreeMap<PriceKey, f64>, levels: &[BookLevel]) {
        for &(price, size) in levels {
            // A NaN key would sort past every real price and poison best-price reads
            if price.is_nan() {
                continue;
            }
            if size > 0.0 {
                side.insert(PriceKey(price), size);
            } else {
                side.remove(&PriceKey(price));
            }
        }
    }

    /// Highest bid price, or 0 when the bid side is empty.
    pub fn best_bid(&self) -> f64 {
        self.bids.keys().next_back().map(|k| k.0).unwrap_or(0.0)
    }

    /// Lowest ask price, or 0 when the ask side is empty.
    pub fn best_ask(&self) -> f64 {
        self.asks.keys().next().map(|k| k.0).unwrap_or(0.0)
    }

    /// Midpoint of best bid and ask when both sides are populated.
    pub fn mid(&self) -> Option<f64> {
        let (bid, ask) = (self.best_bid(), self.best_ask());
        if bid > 0.0 && ask > 0.0 {
            Some(0.5 * (bid + ask))
        } else {
            None
        }
    }

    /// Bid levels from best (highest) to worst.
    pub fn bids_best_first(&self) -> impl Iterator<Item = BookLevel> + '_ {
        self.bids.iter().rev().map(|(k, &size)| (k.0, size))
    }

    /// Ask levels from best (lowest) to worst.
    pub fn asks_best_first(&self) -> impl Iterator<Item = BookLevel> + '_ {
        self.asks.iter().map(|(k, &size)| (k.0, size))
    }

    /// Resting size within `pct` of `mid` on each side, as `(bid, ask)`.
    ///
    /// Bids count at prices >= `mid * (1 - pct)`; asks count at prices
    /// strictly below `mid * (1 + pct)`.
    pub fn depth_within(&self, mid: f64, pct: f64) -> (f64, f64) {
        let lower = mid * (1.0 - pct);
        let upper = mid * (1.0 + pct);

        let bid_depth = self
            .bids_best_first()
            .take_while(|&(price, _)| price >= lower)
            .map(|(_, size)| size)
            .sum();
        let ask_depth = self
            .asks_best_first()
            .take_while(|&(price, _)| price < upper)
            .map(|(_, size)| size)
            .sum();

        (bid_depth, ask_depth)
    }

    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }
}
