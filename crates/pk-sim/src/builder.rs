//! Fluent builder for constructing a [`ParkingSim`].

use std::collections::BTreeMap;

use pk_capacity::{CapacityProjector, Facility};
use pk_core::{ConfigHub, Frame, FrameClock, ParkingConfig, PkError};
use pk_demand::{DemandLedger, DemandThresholds, DemandUpdateEngine, RefreshSignals};
use pk_reroute::RerouteHorizonLimiter;
use tracing::debug;

use crate::{CapacityOracle, ParkingSim, SimError, SimResult};

/// Fluent builder for [`ParkingSim<O>`].
///
/// # Required inputs
///
/// - [`ParkingConfig`]: validated in [`build`][Self::build]
/// - `O: CapacityOracle`: the host's raw capacity source
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default      |
/// |--------------------------|--------------|
/// | `.facilities(v)`         | none         |
/// | `.start_frame(f)`        | `Frame(0)`   |
/// | `.frames_per_tick(n)`    | `1`          |
/// | `.snapshot_interval(n)`  | `0` (never)  |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = ParkingSimBuilder::new(ParkingConfig::default(), table)
///     .facilities([Facility::roadside(FacilityId(0)), Facility::garage(FacilityId(1))])
///     .frames_per_tick(16)
///     .build()?;
/// let report = sim.step(&events, &mut paths, &mut NoopObserver);
/// ```
pub struct ParkingSimBuilder<O: CapacityOracle> {
    config:            ParkingConfig,
    oracle:            O,
    facilities:        Vec<Facility>,
    start_frame:       Frame,
    frames_per_tick:   u32,
    snapshot_interval: u32,
}

impl<O: CapacityOracle> ParkingSimBuilder<O> {
    pub fn new(config: ParkingConfig, oracle: O) -> Self {
        Self {
            config,
            oracle,
            facilities:        Vec::new(),
            start_frame:       Frame::ZERO,
            frames_per_tick:   1,
            snapshot_interval: 0,
        }
    }

    /// Register facilities up front.  May be called repeatedly.
    pub fn facilities(mut self, facilities: impl IntoIterator<Item = Facility>) -> Self {
        self.facilities.extend(facilities);
        self
    }

    pub fn start_frame(mut self, frame: Frame) -> Self {
        self.start_frame = frame;
        self
    }

    /// Frames between two consecutive [`ParkingSim::step`] calls.  Must be `>= 1`.
    pub fn frames_per_tick(mut self, frames: u32) -> Self {
        self.frames_per_tick = frames;
        self
    }

    pub fn snapshot_interval(mut self, ticks: u32) -> Self {
        self.snapshot_interval = ticks;
        self
    }

    /// Validate inputs and return a ready-to-step [`ParkingSim`].
    pub fn build(self) -> SimResult<ParkingSim<O>> {
        if self.frames_per_tick == 0 {
            return Err(SimError::Setup("frames_per_tick must be >= 1".into()));
        }
        let hub = ConfigHub::new(self.config)?;

        let mut facilities = BTreeMap::new();
        for facility in self.facilities {
            if facilities.insert(facility.id, facility).is_some() {
                return Err(PkError::DuplicateFacility(facility.id).into());
            }
        }

        let config = hub.current();
        debug!(
            facilities = facilities.len(),
            start_frame = %self.start_frame,
            demand = config.enable_demand_system,
            reroute_limit = config.enable_reroute_limit,
            "parking sim built"
        );

        Ok(ParkingSim {
            clock:             FrameClock::new(self.start_frame),
            frames_per_tick:   self.frames_per_tick,
            snapshot_interval: self.snapshot_interval,
            ledger:            DemandLedger::new(),
            signals:           RefreshSignals::new(),
            oracle:            self.oracle,
            facilities,
            engine:            DemandUpdateEngine::new(DemandThresholds::from_config(config)),
            projector:         CapacityProjector::from_config(config),
            limiter:           RerouteHorizonLimiter::from_config(config),
            hub,
        })
    }
}
