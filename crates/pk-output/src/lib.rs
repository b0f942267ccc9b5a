//! `pk-output`: demand trace writers for the parking sim.
//!
//! | File                   | Written on                        |
//! |------------------------|-----------------------------------|
//! | `demand_snapshots.csv` | every `snapshot_interval` ticks   |
//! | `refreshes.csv`        | every facility refresh            |
//! | `tick_summaries.csv`   | every tick                        |
//!
//! The writer implements [`OutputWriter`] and is driven by
//! [`DemandOutputObserver`], which implements `pk_sim::ParkingObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pk_output::{CsvWriter, DemandOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = DemandOutputObserver::new(writer);
//! for _ in 0..ticks {
//!     sim.step(&events, &mut paths, &mut obs);
//! }
//! obs.finish();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::DemandOutputObserver;
pub use row::{DemandSnapshotRow, RefreshRow, TickSummaryRow};
pub use writer::OutputWriter;
