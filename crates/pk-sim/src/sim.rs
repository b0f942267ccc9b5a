//! The `ParkingSim` struct and its tick loop.

use std::collections::BTreeMap;

use pk_capacity::{CapacityProjector, Facility, FacilityKind, Projection, RawCapacity};
use pk_core::{ConfigHub, FacilityId, Frame, FrameClock, ParkingConfig, PkError};
use pk_demand::{
    CommitSummary, DemandLedger, DemandRecord, DemandThresholds, DemandUpdateEngine,
    FacilityEvents, LedgerMutation, MutationLog, RefreshSignals,
};
use pk_reroute::{PathFlags, RerouteHorizonLimiter, VehiclePath, locate_parking_target};
use tracing::{debug, trace};

use crate::{CapacityOracle, EventKind, FacilityEvent, ParkingObserver, SimResult};

// ── Tick report ───────────────────────────────────────────────────────────────

/// What one call to [`ParkingSim::step`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub frame:            Frame,
    /// Events accepted, including queued events derived from fresh paths.
    pub events:           usize,
    /// Events naming a facility that is not registered.
    pub skipped_events:   usize,
    /// Facilities evaluated by the demand transition.
    pub evaluated:        usize,
    pub commit:           CommitSummary,
    /// Facilities whose capacity was re-projected for the graph builder,
    /// ascending by id.
    pub refreshed:        Vec<FacilityId>,
    /// Records dropped because their lane had no viable space left.
    pub corrective_drops: usize,
    /// Whether the horizon check ran this tick.
    pub horizon_checked:  bool,
    /// Obsolete flags hidden by the horizon limiter.
    pub suppressed:       usize,
}

// ── ParkingSim ────────────────────────────────────────────────────────────────

/// The parking demand runner.
///
/// `ParkingSim<O>` holds the ledger, the facility registry and the derived
/// per-config helpers, and drives this tick:
///
/// 1. **Fresh paths**: every vehicle whose path carries `UPDATED` is searched
///    for its parking target, which becomes a `Queued` event.
/// 2. **Aggregate**: events are counted per facility (ascending id).
/// 3. **Transition phase** (optionally parallel with the `parallel` feature):
///    every facility with events or a live record is evaluated into a
///    [`MutationLog`].
/// 4. **Commit** (sequential, ascending `FacilityId`).
/// 5. **Refresh**: pending refresh signals are drained, raw capacity is
///    sampled from the oracle and projected.  Lanes with no viable space get
///    their record dropped.
/// 6. **Horizon**: every `reroute_check_interval` ticks, obsolete paths are
///    passed through the [`RerouteHorizonLimiter`].
///
/// Create via [`ParkingSimBuilder`][crate::ParkingSimBuilder].
pub struct ParkingSim<O: CapacityOracle> {
    /// Active settings.  Replace through [`ParkingSim::apply_config`] so the
    /// derived helpers follow.
    pub(crate) hub: ConfigHub,

    pub clock: FrameClock,

    /// Frames the clock advances after each [`step`][Self::step].
    pub frames_per_tick: u32,

    /// Call `on_snapshot` every N ticks; `0` disables snapshots.
    pub snapshot_interval: u32,

    /// Sparse `FacilityId → DemandRecord` map.
    pub ledger: DemandLedger,

    pub signals: RefreshSignals,

    pub oracle: O,

    pub(crate) facilities: BTreeMap<FacilityId, Facility>,
    pub(crate) engine:     DemandUpdateEngine,
    pub(crate) projector:  CapacityProjector,
    pub(crate) limiter:    RerouteHorizonLimiter,
}

impl<O: CapacityOracle> ParkingSim<O> {
    // ── Configuration ─────────────────────────────────────────────────────

    pub fn config(&self) -> &ParkingConfig {
        self.hub.current()
    }

    /// The hub owning the active config, for registering listeners.
    pub fn config_hub_mut(&mut self) -> &mut ConfigHub {
        &mut self.hub
    }

    /// Validate and apply new settings.
    ///
    /// Thresholds, projector and limiter are re-derived immediately; existing
    /// records are kept as they are.  A changed garage multiplier changes
    /// every garage's capacity, so every garage is signalled for refresh.
    /// On error the previous settings stay active.
    pub fn apply_config(&mut self, next: ParkingConfig) -> SimResult<()> {
        let previous = self.hub.apply(next)?;
        let current = self.hub.current().clone();
        self.derive(&current);

        if previous.garage_spots_multiplier != current.garage_spots_multiplier {
            let mut signalled = 0usize;
            for facility in self.facilities.values().filter(|f| f.kind == FacilityKind::GarageLane) {
                if self.signals.signal(facility.id) {
                    signalled += 1;
                }
            }
            debug!(
                from = previous.garage_spots_multiplier,
                to = current.garage_spots_multiplier,
                signalled,
                "garage multiplier changed"
            );
        }
        Ok(())
    }

    pub(crate) fn derive(&mut self, config: &ParkingConfig) {
        self.engine.set_thresholds(DemandThresholds::from_config(config));
        self.projector = CapacityProjector::from_config(config);
        self.limiter = RerouteHorizonLimiter::from_config(config);
    }

    // ── Facility registry ─────────────────────────────────────────────────

    pub fn register_facility(&mut self, facility: Facility) -> SimResult<()> {
        if self.facilities.contains_key(&facility.id) {
            return Err(PkError::DuplicateFacility(facility.id).into());
        }
        self.facilities.insert(facility.id, facility);
        Ok(())
    }

    /// Forget a demolished facility together with its demand record.
    pub fn remove_facility(&mut self, id: FacilityId) -> SimResult<Option<DemandRecord>> {
        if self.facilities.remove(&id).is_none() {
            return Err(PkError::FacilityNotFound(id).into());
        }
        let record = self.ledger.remove(id);
        trace!(facility = %id, had_record = record.is_some(), "facility removed");
        Ok(record)
    }

    pub fn facility(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.get(&id)
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }

    // ── Capacity queries ──────────────────────────────────────────────────

    /// Current effective capacity of `id` without touching the ledger.
    ///
    /// `Ok(None)` when the oracle has no reading for the facility.
    pub fn effective_capacity(&self, id: FacilityId) -> SimResult<Option<Projection>> {
        let facility = self.facilities.get(&id).ok_or(PkError::FacilityNotFound(id))?;
        Ok(self.sample(facility).map(|raw| self.projector.project(raw, self.ledger.get(id))))
    }

    /// Whether a vehicle that reached garage `id` can park.  Judged on the
    /// physical occupancy; demand never turns away a vehicle already there.
    ///
    /// `Ok(None)` when `id` is not a garage or has no reading.
    pub fn garage_has_room(&self, id: FacilityId) -> SimResult<Option<bool>> {
        let facility = self.facilities.get(&id).ok_or(PkError::FacilityNotFound(id))?;
        if facility.kind != FacilityKind::GarageLane {
            return Ok(None);
        }
        Ok(self.sample(facility).and_then(|raw| match raw {
            RawCapacity::Garage { occupancy, vanilla_capacity } => Some(
                self.projector.garage(occupancy, vanilla_capacity, None).has_room_on_arrival(),
            ),
            RawCapacity::Roadside { .. } => None,
        }))
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Process one tick at the clock's current frame, then advance the clock
    /// by [`frames_per_tick`][Self::frames_per_tick].
    ///
    /// `vehicles` are the host's path buffers.  They are read for fresh
    /// parking targets and, on horizon ticks, may have `OBSOLETE` cleared.
    /// `UPDATED` is left for the host to clear once its frame is done.
    pub fn step<B: ParkingObserver>(
        &mut self,
        events:   &[FacilityEvent],
        vehicles: &mut [VehiclePath],
        observer: &mut B,
    ) -> TickReport {
        let now = self.clock.current;
        observer.on_tick_start(now);

        let report = self.process_tick(now, events, vehicles, observer);
        observer.on_tick_end(now, &report);

        if self.snapshot_interval > 0 && self.clock.is_tick_multiple_of(self.snapshot_interval) {
            observer.on_snapshot(now, &self.ledger);
        }
        self.clock.advance(self.frames_per_tick);
        report
    }

    /// Move the clock forward without processing (idle frames).
    pub fn skip_frames(&mut self, frames: u32) {
        self.clock.current = Frame(self.clock.current.0.saturating_add(frames));
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<B: ParkingObserver>(
        &mut self,
        now:      Frame,
        events:   &[FacilityEvent],
        vehicles: &mut [VehiclePath],
        observer: &mut B,
    ) -> TickReport {
        let mut report = TickReport { frame: now, ..Default::default() };

        // ── Phase 1 + 2: aggregate events per facility ────────────────────
        let mut per_facility: BTreeMap<FacilityId, FacilityEvents> = BTreeMap::new();
        let derived = self.derive_queued_events(vehicles);
        for event in events.iter().chain(derived.iter()) {
            if !self.facilities.contains_key(&event.facility) {
                trace!(facility = %event.facility, kind = ?event.kind, "event for unknown facility skipped");
                report.skipped_events += 1;
                continue;
            }
            let counts = per_facility.entry(event.facility).or_default();
            match event.kind {
                EventKind::Queued => counts.queued = counts.queued.saturating_add(1),
                EventKind::Parked => counts.parked = counts.parked.saturating_add(1),
            }
            report.events += 1;
        }

        // Live records decay (or are torn down) even without events.
        for (facility, _) in self.ledger.iter() {
            per_facility.entry(facility).or_default();
        }

        let work: Vec<(FacilityId, Option<DemandRecord>, FacilityEvents)> = per_facility
            .into_iter()
            .map(|(facility, ev)| (facility, self.ledger.get(facility), ev))
            .collect();
        report.evaluated = work.len();

        // ── Phase 3: transitions (produce) ────────────────────────────────
        let log = self.compute_transitions(now, &work);

        // ── Phase 4: commit (consume) ─────────────────────────────────────
        report.commit = log.commit(&mut self.ledger, &mut self.signals);

        // ── Phase 5: capacity refresh ─────────────────────────────────────
        let (refreshed, drops) = self.refresh_capacities(now, observer);
        report.refreshed = refreshed;
        report.corrective_drops = drops;

        // ── Phase 6: reroute horizon ──────────────────────────────────────
        let interval = self.hub.current().reroute_check_interval;
        if self.clock.is_tick_multiple_of(interval) {
            report.horizon_checked = true;
            report.suppressed = self.check_horizons(vehicles);
        }

        report
    }

    /// Queued events for vehicles whose pathfinder just delivered a new path.
    fn derive_queued_events(&self, vehicles: &[VehiclePath]) -> Vec<FacilityEvent> {
        if !self.engine.thresholds().enabled {
            return Vec::new();
        }
        vehicles
            .iter()
            .filter(|p| p.flags.contains(PathFlags::UPDATED))
            .filter_map(|p| locate_parking_target(&p.elements))
            .map(FacilityEvent::queued)
            .collect()
    }

    /// Evaluate every facility's transition into one mutation log.
    ///
    /// With the `parallel` Cargo feature each Rayon worker fills its own log
    /// and the logs are merged pairwise; the commit sorts by facility, so the
    /// outcome is identical either way.
    fn compute_transitions(
        &self,
        now:  Frame,
        work: &[(FacilityId, Option<DemandRecord>, FacilityEvents)],
    ) -> MutationLog {
        let engine = self.engine;

        #[cfg(not(feature = "parallel"))]
        {
            work.iter().fold(MutationLog::new(), |mut log, &(facility, old, events)| {
                log.push(engine.transition(facility, old, events, now));
                log
            })
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            work.par_iter()
                .fold(MutationLog::new, |mut log, &(facility, old, events)| {
                    log.push(engine.transition(facility, old, events, now));
                    log
                })
                .reduce(MutationLog::new, MutationLog::merge)
        }
    }

    /// Drain refresh signals and hand re-projected capacity to the observer.
    ///
    /// A facility the oracle cannot sample stays signalled and is retried on
    /// later ticks.  Signals for facilities no longer registered are dropped.
    fn refresh_capacities<B: ParkingObserver>(
        &mut self,
        now:      Frame,
        observer: &mut B,
    ) -> (Vec<FacilityId>, usize) {
        let pending = self.signals.drain();
        let mut refreshed = Vec::with_capacity(pending.len());
        let mut cleanup = MutationLog::new();

        for id in pending {
            let Some(facility) = self.facilities.get(&id) else {
                trace!(facility = %id, "refresh for unregistered facility skipped");
                continue;
            };
            let Some(raw) = self.sample(facility) else {
                // Kept pending until a reading shows up.
                self.signals.signal(id);
                trace!(facility = %id, "no capacity reading; refresh deferred");
                continue;
            };
            let record = self.ledger.get(id);
            let projection = self.projector.project(raw, record);
            if projection.drop_record && record.is_some() {
                debug!(facility = %id, "lane has no viable space; demand record dropped");
                cleanup.push_mutation(LedgerMutation::Remove { facility: id });
            }
            observer.on_refresh(now, id, &projection);
            refreshed.push(id);
        }

        let drops = cleanup.len();
        if drops > 0 {
            cleanup.commit(&mut self.ledger, &mut self.signals);
        }
        (refreshed, drops)
    }

    fn check_horizons(&self, vehicles: &mut [VehiclePath]) -> usize {
        let mut suppressed = 0;
        for path in vehicles.iter_mut() {
            if path.flags.contains(PathFlags::OBSOLETE) && self.limiter.check(path).1 {
                suppressed += 1;
            }
        }
        suppressed
    }

    /// Sample the oracle, discarding readings of the wrong kind.
    fn sample(&self, facility: &Facility) -> Option<RawCapacity> {
        let raw = self.oracle.sample(facility)?;
        if raw.kind() != facility.kind {
            trace!(facility = %facility.id, expected = ?facility.kind, got = ?raw.kind(), "capacity reading of wrong kind skipped");
            return None;
        }
        Some(raw)
    }
}
