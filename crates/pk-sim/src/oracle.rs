//! Inputs supplied by the host each tick: raw capacity samples and facility
//! events.

use std::collections::HashMap;

use pk_capacity::{Facility, RawCapacity};
use pk_core::FacilityId;

/// Read-only view of the host's physical parking state.
///
/// The host computes free curb space and garage occupancy from geometry and
/// vehicle counts; the simulator only ever asks for the current figures of a
/// facility it is about to refresh.  `None` means the facility could not be
/// sampled this tick (e.g. it is being rebuilt) and is skipped.
pub trait CapacityOracle {
    fn sample(&self, facility: &Facility) -> Option<RawCapacity>;
}

impl<F> CapacityOracle for F
where
    F: Fn(&Facility) -> Option<RawCapacity>,
{
    fn sample(&self, facility: &Facility) -> Option<RawCapacity> {
        self(facility)
    }
}

/// An oracle backed by a plain table, updated by the caller between ticks.
#[derive(Debug, Default, Clone)]
pub struct CapacityTable {
    samples: HashMap<FacilityId, RawCapacity>,
}

impl CapacityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, facility: FacilityId, raw: RawCapacity) {
        self.samples.insert(facility, raw);
    }

    pub fn get(&self, facility: FacilityId) -> Option<RawCapacity> {
        self.samples.get(&facility).copied()
    }

    pub fn remove(&mut self, facility: FacilityId) -> Option<RawCapacity> {
        self.samples.remove(&facility)
    }
}

impl CapacityOracle for CapacityTable {
    fn sample(&self, facility: &Facility) -> Option<RawCapacity> {
        self.get(facility.id)
    }
}

/// What happened at a facility.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A vehicle picked the facility as its parking target.
    Queued,
    /// A queued vehicle parked there.
    Parked,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FacilityEvent {
    pub facility: FacilityId,
    pub kind:     EventKind,
}

impl FacilityEvent {
    pub fn queued(facility: FacilityId) -> Self {
        Self { facility, kind: EventKind::Queued }
    }

    pub fn parked(facility: FacilityId) -> Self {
        Self { facility, kind: EventKind::Parked }
    }
}
