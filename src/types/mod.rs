//! Value types exchanged between the streaming components and the host.
//!
//! Everything here is an immutable snapshot passed by value: ticks flow into
//! the detectors, sweep events flow into the strategy, frames and actions flow
//! out to whatever decision layer sits on top.

mod action;
mod frame;
mod market;
mod sweep;

pub use action::*;
pub use frame::*;
pub use market::*;
pub use sweep::*;
