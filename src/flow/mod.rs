//! Streaming order-flow components.
//!
//! - `sweep`: dual-window burst detector with latch/re-arm hysteresis
//! - `features`: multi-horizon volume, depth, breakout and aggressor-run features
//! - `order_book`: L2 book rebuilt from snapshots and deltas
//! - `rolling_extreme`: O(1) trailing max/min
//!
//! Every component is a synchronous state machine owned by one caller. Run one
//! set of instances per instrument.

mod features;
mod order_book;
mod rolling_extreme;
mod sweep;
mod window;


pub use features::OrderFlowFeatureExtractor;
pub use order_book::OrderBook;
pub use rolling_extreme::RollingExtreme;
pub use sweep::SweepModel;
