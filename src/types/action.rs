//! Strategy actions and position state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[repr(u8)]
pub enum StrategyActionType {
    #[default]
    Idle = 0,
    OpenLong = 1,
    OpenShort = 2,
    Close = 3,
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum PositionDirection {
    Long,
    Short,
}

impl PositionDirection {
    /// +1 long, -1 short.
    pub fn sign(self) -> i8 {
        match self {
            PositionDirection::Long => 1,
            PositionDirection::Short => -1,
        }
    }
}

/// An open position. Only exists while the strategy is in a trade.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub direction: PositionDirection,
    pub entry_price: f64,
    pub entry_ts: f64,
}

/// What the strategy wants the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct StrategyAction {
    #[serde(rename = "type")]
    pub action_type: StrategyActionType,
    /// +1 long, -1 short, 0 for idle
    pub dir: i8,
    pub price: f64,
    pub ts: f64,
}

impl StrategyAction {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Idle action carrying a timestamp.
    pub(crate) fn idle_at(ts: f64) -> Self {
        Self {
            ts,
            ..Self::default()
        }
    }

    pub(crate) fn open(direction: PositionDirection, price: f64, ts: f64) -> Self {
        let action_type = match direction {
            PositionDirection::Long => StrategyActionType::OpenLong,
            PositionDirection::Short => StrategyActionType::OpenShort,
        };
        Self {
            action_type,
            dir: direction.sign(),
            price,
            ts,
        }
    }

    pub(crate) fn close(direction: PositionDirection, price: f64, ts: f64) -> Self {
        Self {
            action_type: StrategyActionType::Close,
            dir: direction.sign(),
            price,
            ts,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.action_type == StrategyActionType::Idle
    }
}
