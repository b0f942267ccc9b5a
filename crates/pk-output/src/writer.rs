//! The `OutputWriter` trait implemented by backend writers.

use crate::{DemandSnapshotRow, OutputResult, RefreshRow, TickSummaryRow};

/// Sink for the demand trace.
///
/// Errors are reported per call; [`DemandOutputObserver`][crate::DemandOutputObserver]
/// keeps the first one for [`take_error`][crate::DemandOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of demand records taken at one frame.
    fn write_snapshots(&mut self, rows: &[DemandSnapshotRow]) -> OutputResult<()>;

    fn write_refresh(&mut self, row: &RefreshRow) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
