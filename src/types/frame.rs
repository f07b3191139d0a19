//! Order-flow feature snapshot.

use serde::{Deserialize, Serialize};

/// Direction of a confirmed multi-second aggressor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[repr(i8)]
pub enum AggRunDir {
    #[default]
    None = 0,
    Buy = 1,
    Sell = -1,
}

/// Book side with materially thinner near-touch depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[repr(i8)]
pub enum WeakSide {
    #[default]
    None = 0,
    Bid = 1,
    Ask = -1,
}

/// Immutable snapshot of order-flow features at `ts`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct OrderFlowFrame {
    pub ts: f64,
    /// Book mid, or last traded price when either side is empty
    pub mid: f64,
    pub best_bid: f64,
    pub best_ask: f64,

    pub buy_vol_1s: f64,
    pub sell_vol_1s: f64,
    pub buy_vol_3s: f64,
    pub sell_vol_3s: f64,
    pub buy_vol_10s: f64,
    pub sell_vol_10s: f64,

    pub buy_share_1s: f64,
    pub sell_share_1s: f64,
    pub buy_share_3s: f64,
    pub sell_share_3s: f64,
    pub buy_share_10s: f64,
    pub sell_share_10s: f64,

    /// Resting size within 0.1% / 0.3% / 0.5% of mid
    pub liq01_bid: f64,
    pub liq01_ask: f64,
    pub liq03_bid: f64,
    pub liq03_ask: f64,
    pub liq05_bid: f64,
    pub liq05_ask: f64,

    pub is_new_high_20s: bool,
    pub is_new_low_20s: bool,
    pub is_new_high_30s: bool,
    pub is_new_low_30s: bool,

    pub agg_run_dir: AggRunDir,
    pub weak_side_01: WeakSide,
}
