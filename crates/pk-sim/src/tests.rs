//! Integration tests for pk-sim.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pk_capacity::{EffectiveCapacity, Facility, Projection, RawCapacity};
use pk_core::{FacilityId, Frame, LaneId, ParkingConfig, PkError, VehicleId};
use pk_demand::DemandLedger;
use pk_reroute::{LaneKind, PathFlags, PathNode, VehiclePath};

use crate::{
    CapacityTable, FacilityEvent, NoopObserver, ParkingObserver, ParkingSim, ParkingSimBuilder,
    SimError, TickReport,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const G: FacilityId = FacilityId(1);
const R: FacilityId = FacilityId(2);

fn table() -> CapacityTable {
    let mut t = CapacityTable::new();
    t.set(G, RawCapacity::Garage { occupancy: 0, vanilla_capacity: 10 });
    t.set(R, RawCapacity::Roadside { free_space: 30.0 });
    t
}

/// Default config (tolerance 6, size 3, cooldown 1000) with one garage and
/// one roadside lane.
fn sim() -> ParkingSim<CapacityTable> {
    sim_with(ParkingConfig::default())
}

fn sim_with(config: ParkingConfig) -> ParkingSim<CapacityTable> {
    ParkingSimBuilder::new(config, table())
        .facilities([Facility::garage(G), Facility::roadside(R)])
        .build()
        .unwrap()
}

fn step_at(sim: &mut ParkingSim<CapacityTable>, frame: u32, events: &[FacilityEvent]) -> TickReport {
    sim.clock.current = Frame(frame);
    sim.step(events, &mut [], &mut NoopObserver)
}

fn queued(f: FacilityId, n: usize) -> Vec<FacilityEvent> {
    vec![FacilityEvent::queued(f); n]
}

fn demand(sim: &ParkingSim<CapacityTable>, f: FacilityId) -> Option<i16> {
    sim.ledger.get(f).map(|r| r.demand)
}

/// A car trip of `roads` road nodes ending at garage `G`.
fn trip_to_garage(roads: u32) -> Vec<PathNode> {
    let mut nodes: Vec<PathNode> = (0..roads).map(PathNode::road).collect();
    nodes.push(PathNode::new(LaneId(500), LaneKind::Garage(G)));
    nodes.push(PathNode::new(LaneId(501), LaneKind::Other));
    nodes
}

fn vehicle(nodes: Vec<PathNode>, lookahead: usize, flags: PathFlags) -> VehiclePath {
    let mut p = VehiclePath::new(VehicleId(0));
    p.navigation = nodes[..lookahead].to_vec();
    p.elements = nodes;
    p.element_index = lookahead;
    p.flags = flags;
    p
}

#[derive(Default)]
struct Recorder {
    starts:    usize,
    ends:      usize,
    refreshes: Vec<(Frame, FacilityId, Projection)>,
    snapshots: Vec<(Frame, usize)>,
}

impl ParkingObserver for Recorder {
    fn on_tick_start(&mut self, _frame: Frame) {
        self.starts += 1;
    }

    fn on_refresh(&mut self, frame: Frame, facility: FacilityId, projection: &Projection) {
        self.refreshes.push((frame, facility, *projection));
    }

    fn on_tick_end(&mut self, _frame: Frame, _report: &TickReport) {
        self.ends += 1;
    }

    fn on_snapshot(&mut self, frame: Frame, ledger: &DemandLedger) {
        self.snapshots.push((frame, ledger.len()));
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let s = sim();
        assert_eq!(s.facility_count(), 2);
        assert_eq!(s.clock.current, Frame(0));
        assert_eq!(s.frames_per_tick, 1);
        assert!(s.ledger.is_empty());
    }

    #[test]
    fn duplicate_facility_rejected() {
        let result = ParkingSimBuilder::new(ParkingConfig::default(), table())
            .facilities([Facility::garage(G), Facility::roadside(G)])
            .build();
        assert!(matches!(result, Err(SimError::Core(PkError::DuplicateFacility(f))) if f == G));
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = ParkingConfig { demand_size_per_spot: 0.0, ..Default::default() };
        let result = ParkingSimBuilder::new(cfg, table()).build();
        assert!(matches!(result, Err(SimError::Core(PkError::Config(_)))));
    }

    #[test]
    fn zero_frames_per_tick_rejected() {
        let result = ParkingSimBuilder::new(ParkingConfig::default(), table())
            .frames_per_tick(0)
            .build();
        assert!(matches!(result, Err(SimError::Setup(_))));
    }

    #[test]
    fn clock_advances_by_frames_per_tick() {
        let mut s = ParkingSimBuilder::new(ParkingConfig::default(), table())
            .start_frame(Frame(100))
            .frames_per_tick(16)
            .build()
            .unwrap();
        s.step(&[], &mut [], &mut NoopObserver);
        s.step(&[], &mut [], &mut NoopObserver);
        assert_eq!(s.clock.current, Frame(132));
        assert_eq!(s.clock.ticks, 2);
        s.skip_frames(8);
        assert_eq!(s.clock.current, Frame(140));
        assert_eq!(s.clock.ticks, 2);
    }

    #[test]
    fn closure_oracle() {
        let oracle = |_: &Facility| Some(RawCapacity::Roadside { free_space: 12.0 });
        let s = ParkingSimBuilder::new(ParkingConfig::default(), oracle)
            .facilities([Facility::roadside(R)])
            .build()
            .unwrap();
        let p = s.effective_capacity(R).unwrap().unwrap();
        assert_eq!(p.effective, EffectiveCapacity::Roadside { free_space: 12.0 });
    }
}

// ── Demand lifecycle ──────────────────────────────────────────────────────────

#[cfg(test)]
mod demand_tests {
    use super::*;

    #[test]
    fn end_to_end_decay() {
        let mut s = sim();

        // Ten queued vehicles at frame 0 → demand 10, bucket 2.
        let r = step_at(&mut s, 0, &queued(G, 10));
        assert_eq!(demand(&s, G), Some(10));
        assert_eq!(r.refreshed, vec![G]);
        assert_eq!(r.events, 10);

        // Within the cooldown window nothing moves.
        let r = step_at(&mut s, 999, &[]);
        assert_eq!(demand(&s, G), Some(10));
        assert!(r.refreshed.is_empty());

        // 10 → 9 crosses into bucket 1.
        let r = step_at(&mut s, 1000, &[]);
        assert_eq!(demand(&s, G), Some(9));
        assert_eq!(r.refreshed, vec![G]);

        let mut refresh_frames = Vec::new();
        for k in 2..=10u32 {
            let frame = k * 1000;
            let r = step_at(&mut s, frame, &[]);
            assert_eq!(demand(&s, G), Some(10 - k as i16), "frame {frame}");
            if !r.refreshed.is_empty() {
                refresh_frames.push(frame);
            }
        }
        // Only 7 → 6 leaves the penalty range.
        assert_eq!(refresh_frames, vec![4000]);

        // Demand reached 0 on a clock reset, so the record lingers until the
        // next evaluation.
        let r = step_at(&mut s, 10_001, &[]);
        assert_eq!(demand(&s, G), None);
        assert_eq!(r.commit.removals, 1);
        assert_eq!(r.refreshed, vec![G]);

        let r = step_at(&mut s, 12_000, &[]);
        assert_eq!(r.evaluated, 0);
        assert!(r.refreshed.is_empty());
    }

    #[test]
    fn debounce_single_refresh() {
        let mut s = sim();
        let mut refreshes = 0;
        for frame in 0..9u32 {
            let r = step_at(&mut s, frame, &queued(G, 1));
            refreshes += r.refreshed.len();
        }
        // 1..=6 stay in bucket 0; 7 enters bucket 1; 8 and 9 stay there.
        assert_eq!(demand(&s, G), Some(9));
        assert_eq!(refreshes, 1);
    }

    #[test]
    fn queued_and_parked_same_tick_cancel() {
        let mut s = sim();
        step_at(&mut s, 0, &queued(G, 8));
        let r = step_at(&mut s, 10, &[FacilityEvent::queued(G), FacilityEvent::parked(G)]);
        assert_eq!(demand(&s, G), Some(8));
        assert!(r.refreshed.is_empty());
        assert_eq!(s.ledger.get(G).unwrap().cooldown_start, Frame(10));
    }

    #[test]
    fn unknown_facility_skipped() {
        let mut s = sim();
        let r = step_at(&mut s, 0, &[FacilityEvent::queued(FacilityId(99)), FacilityEvent::queued(G)]);
        assert_eq!(r.skipped_events, 1);
        assert_eq!(r.events, 1);
        assert_eq!(demand(&s, FacilityId(99)), None);
        assert_eq!(demand(&s, G), Some(1));
    }

    #[test]
    fn event_order_does_not_matter() {
        let mut forward = sim();
        let mut reverse = sim();
        let mut events = queued(G, 9);
        events.extend(queued(R, 4));
        events.push(FacilityEvent::parked(G));

        step_at(&mut forward, 0, &events);
        events.reverse();
        step_at(&mut reverse, 0, &events);

        assert_eq!(forward.ledger.iter().collect::<Vec<_>>().len(), 2);
        for f in [G, R] {
            assert_eq!(forward.ledger.get(f), reverse.ledger.get(f));
        }
    }

    #[test]
    fn unviable_lane_drops_record() {
        let mut s = sim();
        s.oracle.set(R, RawCapacity::Roadside { free_space: 1.5 });
        let r = step_at(&mut s, 0, &queued(R, 10));
        assert_eq!(r.refreshed, vec![R]);
        assert_eq!(r.corrective_drops, 1);
        assert_eq!(demand(&s, R), None);
        assert!(s.signals.is_empty());
    }

    #[test]
    fn missing_reading_skips_refresh_but_keeps_record() {
        let mut s = sim();
        s.oracle.remove(G);
        let r = step_at(&mut s, 0, &queued(G, 10));
        assert!(r.refreshed.is_empty());
        assert_eq!(demand(&s, G), Some(10));
        assert!(s.signals.is_pending(G));
    }

    #[test]
    fn final_refresh_waits_for_reading() {
        let mut s = sim();
        let r = step_at(&mut s, 0, &queued(G, 10));
        assert_eq!(r.refreshed, vec![G]);

        // Reading unavailable on the tick the record goes away.
        s.oracle.remove(G);
        let r = step_at(&mut s, 10, &vec![FacilityEvent::parked(G); 10]);
        assert_eq!(r.commit.removals, 1);
        assert!(r.refreshed.is_empty());
        assert_eq!(demand(&s, G), None);
        assert!(s.signals.is_pending(G));

        // Still pending while the reading is missing.
        let r = step_at(&mut s, 11, &[]);
        assert!(r.refreshed.is_empty());
        assert!(s.signals.is_pending(G));

        s.oracle.set(G, RawCapacity::Garage { occupancy: 0, vanilla_capacity: 10 });
        let mut rec = Recorder::default();
        s.clock.current = Frame(12);
        let r = s.step(&[], &mut [], &mut rec);
        assert_eq!(r.refreshed, vec![G]);
        assert!(!s.signals.is_pending(G));
        match rec.refreshes[0].2.effective {
            EffectiveCapacity::Garage(g) => {
                assert_eq!(g.effective, 0);
                assert_eq!(g.count_with_demand, None);
            }
            other => panic!("expected garage, got {other:?}"),
        }

        // Delivered once.
        let r = step_at(&mut s, 13, &[]);
        assert!(r.refreshed.is_empty());
    }

    #[test]
    fn remove_facility_drops_record() {
        let mut s = sim();
        step_at(&mut s, 0, &queued(G, 3));
        let record = s.remove_facility(G).unwrap();
        assert_eq!(record.map(|r| r.demand), Some(3));
        assert!(s.facility(G).is_none());
        assert!(matches!(s.remove_facility(G), Err(SimError::Core(PkError::FacilityNotFound(_)))));
    }

    #[test]
    fn register_after_build() {
        let mut s = sim();
        let f = FacilityId(7);
        s.register_facility(Facility::roadside(f)).unwrap();
        assert!(s.register_facility(Facility::garage(f)).is_err());
        step_at(&mut s, 0, &queued(f, 2));
        assert_eq!(demand(&s, f), Some(2));
    }
}

// ── Capacity ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod capacity_tests {
    use super::*;

    #[test]
    fn garage_projection_after_demand() {
        let mut s = sim();
        step_at(&mut s, 0, &queued(G, 12));
        let p = s.effective_capacity(G).unwrap().unwrap();
        match p.effective {
            EffectiveCapacity::Garage(g) => {
                assert_eq!(g.actual, 0);
                assert_eq!(g.effective, 2);
                assert_eq!(g.capacity, 10);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn roadside_projection_after_demand() {
        let mut s = sim();
        step_at(&mut s, 0, &queued(R, 9));
        let p = s.effective_capacity(R).unwrap().unwrap();
        match p.effective {
            EffectiveCapacity::Roadside { free_space } => assert!((free_space - 24.0).abs() < 1e-4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn arrival_ignores_demand() {
        let mut s = sim();
        s.oracle.set(G, RawCapacity::Garage { occupancy: 4, vanilla_capacity: 10 });
        step_at(&mut s, 0, &queued(G, 200));
        assert_eq!(s.garage_has_room(G).unwrap(), Some(true));

        s.oracle.set(G, RawCapacity::Garage { occupancy: 10, vanilla_capacity: 10 });
        assert_eq!(s.garage_has_room(G).unwrap(), Some(false));
        assert_eq!(s.garage_has_room(R).unwrap(), None);
        assert!(s.garage_has_room(FacilityId(99)).is_err());
    }

    #[test]
    fn wrong_kind_reading_skipped() {
        let mut s = sim();
        s.oracle.set(G, RawCapacity::Roadside { free_space: 30.0 });
        assert_eq!(s.effective_capacity(G).unwrap(), None);
    }

    #[test]
    fn unknown_facility_capacity_errors() {
        let s = sim();
        assert!(matches!(
            s.effective_capacity(FacilityId(42)),
            Err(SimError::Core(PkError::FacilityNotFound(_)))
        ));
    }
}

// ── Configuration hot-reload ──────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn disabling_tears_down_records() {
        let mut s = sim();
        step_at(&mut s, 0, &queued(G, 10));
        step_at(&mut s, 1, &queued(R, 2));

        s.apply_config(ParkingConfig { enable_demand_system: false, ..Default::default() }).unwrap();
        // Hot-reload never rewrites records by itself.
        assert_eq!(s.ledger.len(), 2);

        let r = step_at(&mut s, 2, &queued(G, 5));
        assert!(s.ledger.is_empty());
        assert_eq!(r.refreshed, vec![G, R]);

        let r = step_at(&mut s, 3, &queued(G, 5));
        assert!(s.ledger.is_empty());
        assert!(r.refreshed.is_empty());
    }

    #[test]
    fn rejected_config_keeps_previous() {
        let mut s = sim();
        let bad = ParkingConfig { demand_tolerance: -1, ..Default::default() };
        assert!(s.apply_config(bad).is_err());
        assert_eq!(s.config(), &ParkingConfig::default());
    }

    #[test]
    fn thresholds_follow_config() {
        let mut s = sim();
        step_at(&mut s, 0, &queued(R, 9));
        s.apply_config(ParkingConfig { demand_tolerance: 0, ..Default::default() }).unwrap();
        let p = s.effective_capacity(R).unwrap().unwrap();
        // 9 / 3 = 3 spots of 6 m.
        assert_eq!(p.effective, EffectiveCapacity::Roadside { free_space: 12.0 });
    }

    #[test]
    fn multiplier_change_refreshes_garages_only() {
        let mut s = sim();
        s.apply_config(ParkingConfig { garage_spots_multiplier: 3, ..Default::default() }).unwrap();
        assert!(s.signals.is_pending(G));
        assert!(!s.signals.is_pending(R));

        let mut rec = Recorder::default();
        s.step(&[], &mut [], &mut rec);
        assert_eq!(rec.refreshes.len(), 1);
        let (_, f, p) = rec.refreshes[0];
        assert_eq!(f, G);
        match p.effective {
            EffectiveCapacity::Garage(g) => assert_eq!(g.capacity, 30),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn listeners_notified() {
        let mut s = sim();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        s.config_hub_mut().subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        s.apply_config(ParkingConfig { reroute_limit: 10, ..Default::default() }).unwrap();
        assert!(s.apply_config(ParkingConfig { reroute_check_interval: 0, ..Default::default() }).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

// ── Vehicles ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vehicle_tests {
    use super::*;

    #[test]
    fn fresh_path_queues_target() {
        let mut s = sim();
        let mut vehicles = vec![
            vehicle(trip_to_garage(20), 3, PathFlags::UPDATED),
            vehicle(trip_to_garage(5), 1, PathFlags::EMPTY),
        ];
        s.clock.current = Frame(0);
        let r = s.step(&[], &mut vehicles, &mut NoopObserver);
        assert_eq!(r.events, 1);
        assert_eq!(demand(&s, G), Some(1));
    }

    #[test]
    fn fresh_path_ignored_when_disabled() {
        let mut s = sim_with(ParkingConfig { enable_demand_system: false, ..Default::default() });
        let mut vehicles = vec![vehicle(trip_to_garage(20), 3, PathFlags::UPDATED)];
        let r = s.step(&[], &mut vehicles, &mut NoopObserver);
        assert_eq!(r.events, 0);
        assert!(s.ledger.is_empty());
    }

    #[test]
    fn horizon_runs_on_interval() {
        let mut s = sim();
        let mut vehicles = vec![vehicle(trip_to_garage(40), 3, PathFlags::OBSOLETE)];

        let r = s.step(&[], &mut vehicles, &mut NoopObserver);
        assert!(r.horizon_checked);
        assert_eq!(r.suppressed, 1);
        assert!(!vehicles[0].flags.contains(PathFlags::OBSOLETE));

        // Host flags it again; ticks 1..=3 leave it alone.
        vehicles[0].flags.insert(PathFlags::OBSOLETE);
        for _ in 1..4 {
            let r = s.step(&[], &mut vehicles, &mut NoopObserver);
            assert!(!r.horizon_checked);
            assert!(vehicles[0].flags.contains(PathFlags::OBSOLETE));
        }
        let r = s.step(&[], &mut vehicles, &mut NoopObserver);
        assert!(r.horizon_checked);
        assert_eq!(r.suppressed, 1);
    }

    #[test]
    fn close_target_keeps_obsolete() {
        let mut s = sim();
        let mut vehicles = vec![vehicle(trip_to_garage(3), 2, PathFlags::OBSOLETE)];
        let r = s.step(&[], &mut vehicles, &mut NoopObserver);
        assert_eq!(r.suppressed, 0);
        assert!(vehicles[0].flags.contains(PathFlags::OBSOLETE));
    }

    #[test]
    fn limiter_disabled_keeps_obsolete() {
        let mut s = sim_with(ParkingConfig { enable_reroute_limit: false, ..Default::default() });
        let mut vehicles = vec![vehicle(trip_to_garage(40), 3, PathFlags::OBSOLETE)];
        let r = s.step(&[], &mut vehicles, &mut NoopObserver);
        assert_eq!(r.suppressed, 0);
        assert!(vehicles[0].flags.contains(PathFlags::OBSOLETE));
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;

    #[test]
    fn hooks_called_in_order() {
        let mut s = ParkingSimBuilder::new(ParkingConfig::default(), table())
            .facilities([Facility::garage(G)])
            .snapshot_interval(2)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        s.step(&queued(G, 10), &mut [], &mut rec);
        s.step(&[], &mut [], &mut rec);
        s.step(&[], &mut [], &mut rec);

        assert_eq!(rec.starts, 3);
        assert_eq!(rec.ends, 3);
        assert_eq!(rec.refreshes.len(), 1);
        assert_eq!(rec.refreshes[0].0, Frame(0));
        assert_eq!(rec.snapshots, vec![(Frame(0), 1), (Frame(2), 1)]);
    }
}
