//! Trade tick types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Taker side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(i8)]
pub enum Side {
    /// Buyer-initiated (lifted the ask)
    Buy = 1,
    /// Seller-initiated (hit the bid)
    Sell = -1,
}

impl Side {
    /// Integer code: +1 buy, -1 sell.
    pub fn sign(self) -> i8 {
        self as i8
    }

    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }
}

impl FromStr for Side {
    type Err = Error;

    /// Accepts `B`/`Buy` and `S`/`Sell` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b" | "buy" => Ok(Side::Buy),
            "s" | "sell" => Ok(Side::Sell),
            _ => Err(Error::UnknownSide(s.to_string())),
        }
    }
}

/// A single trade print.
///
/// Timestamps are Unix seconds and must be non-decreasing per feed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Tick {
    pub timestamp: f64,
    pub price: f64,
    pub volume: f64,
    pub side: Side,
}

impl Tick {
    pub fn new(timestamp: f64, price: f64, volume: f64, side: Side) -> Self {
        Self {
            timestamp,
            price,
            volume,
            side,
        }
    }

    pub fn buy(timestamp: f64, price: f64, volume: f64) -> Self {
        Self::new(timestamp, price, volume, Side::Buy)
    }

    pub fn sell(timestamp: f64, price: f64, volume: f64) -> Self {
        Self::new(timestamp, price, volume, Side::Sell)
    }
}

/// A (price, size) pair from an L2 snapshot or delta. Size <= 0 removes the level.
pub type BookLevel = (f64, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_codes() {
        assert_eq!(Side::Buy.sign(), 1);
        assert_eq!(Side::Sell.sign(), -1);
        assert!(Side::Buy.is_buy());
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("B".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("Buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("sell".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!(" S ".parse::<Side>().unwrap(), Side::Sell);
        assert!(matches!("X".parse::<Side>(), Err(Error::UnknownSide(_))));
    }
}
