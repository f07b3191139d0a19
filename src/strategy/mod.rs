//! Trading strategies driven by sweep events and the tick stream.

mod mean_reversion;

pub use mean_reversion::{ExitReason, MeanReversionStrategy};
