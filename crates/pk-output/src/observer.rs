//! `DemandOutputObserver<W>`: bridges `ParkingObserver` to an `OutputWriter`.

use pk_capacity::{EffectiveCapacity, Projection};
use pk_core::{FacilityId, Frame};
use pk_demand::DemandLedger;
use pk_sim::{ParkingObserver, TickReport};

use crate::row::{DemandSnapshotRow, RefreshRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`ParkingObserver`] that writes ledger snapshots, refreshes and tick
/// summaries to any [`OutputWriter`].
///
/// Observer hooks cannot fail, so the first write error is stored.  After the
/// run, call [`finish`][Self::finish] and check [`take_error`][Self::take_error].
pub struct DemandOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> DemandOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Flush the writer.  Errors are stored like any other write error.
    pub fn finish(&mut self) {
        let result = self.writer.finish();
        self.store_err(result);
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

pub(crate) fn refresh_row(frame: Frame, facility: FacilityId, projection: &Projection) -> RefreshRow {
    let (kind, effective, capacity, full_with_demand) = match projection.effective {
        EffectiveCapacity::Roadside { free_space } => ("roadside", free_space, None, false),
        EffectiveCapacity::Garage(g) => {
            ("garage", g.effective as f32, Some(g.capacity), g.is_full_with_demand())
        }
    };
    RefreshRow {
        frame: frame.0,
        facility_id: facility.0,
        kind,
        effective,
        capacity,
        full_with_demand,
        drop_record: projection.drop_record,
    }
}

pub(crate) fn summary_row(frame: Frame, report: &TickReport) -> TickSummaryRow {
    TickSummaryRow {
        frame:            frame.0,
        events:           report.events as u64,
        skipped_events:   report.skipped_events as u64,
        evaluated:        report.evaluated as u64,
        upserts:          report.commit.upserts as u64,
        removals:         report.commit.removals as u64,
        refreshed:        report.refreshed.len() as u64,
        corrective_drops: report.corrective_drops as u64,
        suppressed:       report.suppressed as u64,
    }
}

impl<W: OutputWriter> ParkingObserver for DemandOutputObserver<W> {
    fn on_refresh(&mut self, frame: Frame, facility: FacilityId, projection: &Projection) {
        let result = self.writer.write_refresh(&refresh_row(frame, facility, projection));
        self.store_err(result);
    }

    fn on_tick_end(&mut self, frame: Frame, report: &TickReport) {
        let result = self.writer.write_tick_summary(&summary_row(frame, report));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, frame: Frame, ledger: &DemandLedger) {
        let rows: Vec<DemandSnapshotRow> = ledger
            .facilities()
            .into_iter()
            .filter_map(|f| ledger.get(f).map(|r| (f, r)))
            .map(|(f, r)| DemandSnapshotRow {
                facility_id:          f.0,
                frame:                frame.0,
                demand:               r.demand,
                cooldown_start_frame: r.cooldown_start.0,
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }
}
