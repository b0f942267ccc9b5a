//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `demand_snapshots.csv`
//! - `refreshes.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::writer::OutputWriter;
use crate::{DemandSnapshotRow, OutputResult, RefreshRow, TickSummaryRow};

const SNAPSHOT_HEADER: [&str; 4] = ["facility_id", "frame", "demand", "cooldown_start_frame"];
const REFRESH_HEADER: [&str; 7] = [
    "frame", "facility_id", "kind", "effective", "capacity", "full_with_demand", "drop_record",
];
const SUMMARY_HEADER: [&str; 9] = [
    "frame", "events", "skipped_events", "evaluated", "upserts", "removals", "refreshed",
    "corrective_drops", "suppressed",
];

/// Writes the demand trace to three CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    refreshes: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

/// Header rows are written up front so files are well-formed even when no
/// rows follow.
fn open(dir: &Path, name: &str, header: &[&str]) -> OutputResult<Writer<File>> {
    let mut w = WriterBuilder::new().has_headers(false).from_path(dir.join(name))?;
    w.write_record(header)?;
    Ok(w)
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        Ok(Self {
            snapshots: open(dir, "demand_snapshots.csv", &SNAPSHOT_HEADER)?,
            refreshes: open(dir, "refreshes.csv", &REFRESH_HEADER)?,
            summaries: open(dir, "tick_summaries.csv", &SUMMARY_HEADER)?,
            finished:  false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[DemandSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.serialize(row)?;
        }
        Ok(())
    }

    fn write_refresh(&mut self, row: &RefreshRow) -> OutputResult<()> {
        self.refreshes.serialize(row)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.serialize(row)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.refreshes.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
