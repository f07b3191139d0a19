//! CSV persistence for tick recordings and detected sweeps.
//!
//! Tick files carry a header row `ts,price,volume,side` (`vol` is accepted for
//! `volume`); side is `B`/`Buy` or `S`/`Sell`. Sweep files use
//! `ts_start,ts_end,direction,price_start,price_end,volume_total`.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Result;
use crate::logging::targets;
use crate::types::{Side, SweepEvent, Tick};

#[derive(Debug, Deserialize)]
struct TickRecord {
    ts: f64,
    price: f64,
    #[serde(alias = "vol")]
    volume: f64,
    side: String,
}

impl TickRecord {
    fn into_tick(self) -> Result<Tick> {
        let side: Side = self.side.parse()?;
        Ok(Tick::new(self.ts, self.price, self.volume, side))
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct SweepRecord {
    ts_start: f64,
    ts_end: f64,
    direction: i8,
    price_start: f64,
    price_end: f64,
    volume_total: f64,
}

impl From<&SweepEvent> for SweepRecord {
    fn from(event: &SweepEvent) -> Self {
        Self {
            ts_start: event.ts_start,
            ts_end: event.ts_end,
            direction: event.direction,
            price_start: event.price_start,
            price_end: event.price_end,
            volume_total: event.volume_total,
        }
    }
}

impl From<SweepRecord> for SweepEvent {
    fn from(record: SweepRecord) -> Self {
        Self {
            ts_start: record.ts_start,
            ts_end: record.ts_end,
            price_start: record.price_start,
            price_end: record.price_end,
            volume_total: record.volume_total,
            direction: record.direction,
        }
    }
}

fn reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path)?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file))
}

/// Load ticks in file order.
pub fn load_ticks(path: impl AsRef<Path>) -> Result<Vec<Tick>> {
    let path = path.as_ref();
    let mut reader = reader(path)?;
    let ticks = reader
        .deserialize::<TickRecord>()
        .map(|record| record?.into_tick())
        .collect::<Result<Vec<_>>>()?;
    debug!(target: targets::REPLAY, path = %path.display(), count = ticks.len(), "ticks loaded");
    Ok(ticks)
}

/// Load ticks and stable-sort them by timestamp.
pub fn load_ticks_sorted(path: impl AsRef<Path>) -> Result<Vec<Tick>> {
    let mut ticks = load_ticks(path)?;
    ticks.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    Ok(ticks)
}

pub fn write_sweeps(path: impl AsRef<Path>, events: &[SweepEvent]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(File::create(path.as_ref())?);
    for event in events {
        writer.serialize(SweepRecord::from(event))?;
    }
    writer.flush()?;
    Ok(())
}

/// Load sweeps sorted by trigger time.
pub fn load_sweeps(path: impl AsRef<Path>) -> Result<Vec<SweepEvent>> {
    let mut reader = reader(path.as_ref())?;
    let mut events = reader
        .deserialize::<SweepRecord>()
        .map(|record| record.map(SweepEvent::from).map_err(Into::into))
        .collect::<Result<Vec<_>>>()?;
    events.sort_by(|a, b| a.ts_end.total_cmp(&b.ts_end));
    Ok(events)
}
