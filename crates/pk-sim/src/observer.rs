//! Simulation observer trait for progress reporting and data collection.

use pk_capacity::Projection;
use pk_core::{FacilityId, Frame};
use pk_demand::DemandLedger;

use crate::TickReport;

/// Callbacks invoked by [`ParkingSim::step`][crate::ParkingSim::step].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: refresh counter
///
/// ```rust,ignore
/// struct RefreshCounter(usize);
///
/// impl ParkingObserver for RefreshCounter {
///     fn on_refresh(&mut self, _frame: Frame, _facility: FacilityId, _p: &Projection) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait ParkingObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _frame: Frame) {}

    /// Called once per facility whose pathfinding edges were recomputed this
    /// tick, with the capacity handed to the graph builder.
    fn on_refresh(&mut self, _frame: Frame, _facility: FacilityId, _projection: &Projection) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _frame: Frame, _report: &TickReport) {}

    /// Called every `snapshot_interval` ticks after the tick completes, with
    /// read-only access to every live demand record.
    fn on_snapshot(&mut self, _frame: Frame, _ledger: &DemandLedger) {}
}

/// A [`ParkingObserver`] that does nothing.
pub struct NoopObserver;

impl ParkingObserver for NoopObserver {}
