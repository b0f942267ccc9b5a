//! A toy downtown: one garage and three curbside lanes, with cars that drive
//! in, park for a while and leave.  Stands in for the host's traffic and
//! geometry systems.

use std::collections::BTreeMap;

use pk_capacity::{Facility, RawCapacity};
use pk_core::{FacilityId, LaneId, VehicleId};
use pk_reroute::{LaneKind, PathFlags, PathNode, VehiclePath, locate_parking_target};
use pk_sim::{CapacityTable, FacilityEvent};
use rand::Rng;
use rand::rngs::SmallRng;

pub const GARAGE:          FacilityId = FacilityId(0);
pub const LANES:           [FacilityId; 3] = [FacilityId(1), FacilityId(2), FacilityId(3)];
pub const GARAGE_CAPACITY: u32 = 24;
pub const LANE_LENGTH:     f32 = 60.0;
pub const SLOT_LENGTH:     f32 = 6.0;

const LOOKAHEAD: usize = 4;

pub fn all_facilities() -> impl Iterator<Item = FacilityId> {
    std::iter::once(GARAGE).chain(LANES)
}

pub fn facilities() -> Vec<Facility> {
    std::iter::once(Facility::garage(GARAGE))
        .chain(LANES.into_iter().map(Facility::roadside))
        .collect()
}

fn target_node(facility: FacilityId) -> PathNode {
    let kind = if facility == GARAGE { LaneKind::Garage(facility) } else { LaneKind::Parking(facility) };
    PathNode::new(LaneId(1_000_000 + facility.0), kind)
}

/// Move one node along the path: the lookahead drops its front node and is
/// refilled from the unconsumed elements.
fn advance(path: &mut VehiclePath) {
    if !path.navigation.is_empty() {
        path.navigation.remove(0);
    }
    if let Some(&next) = path.elements.get(path.element_index) {
        path.navigation.push(next);
        path.element_index += 1;
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub spawned:     u64,
    pub parked:      u64,
    pub turned_away: u64,
    pub rerouted:    u64,
    pub left:        u64,
}

pub struct Town {
    /// Cars on the road, in the host's path representation.
    pub paths:     Vec<VehiclePath>,
    pub occupancy: u32,
    pub lane_free: BTreeMap<FacilityId, f32>,
    pub stats:     Stats,
    parked:        Vec<(FacilityId, u64)>,
    next_vehicle:  u32,
    next_lane:     u32,
}

impl Town {
    pub fn new() -> Self {
        Self {
            paths:        Vec::new(),
            occupancy:    0,
            lane_free:    LANES.into_iter().map(|f| (f, LANE_LENGTH)).collect(),
            stats:        Stats::default(),
            parked:       Vec::new(),
            next_vehicle: 0,
            next_lane:    0,
        }
    }

    /// Push current physical capacity into the oracle table.
    pub fn publish(&self, table: &mut CapacityTable) {
        table.set(GARAGE, RawCapacity::Garage { occupancy: self.occupancy, vanilla_capacity: GARAGE_CAPACITY });
        for (&f, &free_space) in &self.lane_free {
            table.set(f, RawCapacity::Roadside { free_space });
        }
    }

    /// A new car with a freshly computed path to `target`.
    pub fn spawn(&mut self, rng: &mut SmallRng, target: FacilityId) {
        let roads = rng.gen_range(8..48);
        let mut nodes: Vec<PathNode> = Vec::with_capacity(roads + 2);
        for _ in 0..roads {
            nodes.push(PathNode::road(self.next_lane));
            self.next_lane += 1;
        }
        nodes.push(target_node(target));
        nodes.push(PathNode::new(LaneId(self.next_lane), LaneKind::Other));
        self.next_lane += 1;

        let mut path = VehiclePath::new(VehicleId(self.next_vehicle));
        self.next_vehicle += 1;
        let lookahead = LOOKAHEAD.min(nodes.len());
        path.navigation = nodes[..lookahead].to_vec();
        path.element_index = lookahead;
        path.elements = nodes;
        path.flags = PathFlags::UPDATED;

        self.paths.push(path);
        self.stats.spawned += 1;
    }

    /// Move every car one node.  Cars reaching their parking node park if
    /// there is physical room and are turned away otherwise.
    pub fn drive(&mut self, tick: u64, garage_capacity: u32, rng: &mut SmallRng) -> Vec<FacilityEvent> {
        let mut events = Vec::new();
        let mut i = 0;
        while i < self.paths.len() {
            let path = &mut self.paths[i];
            path.flags.remove(PathFlags::UPDATED);
            advance(path);

            let arrived = match path.navigation.first() {
                None => Some(None),
                Some(node) => node.kind.facility().map(Some),
            };
            match arrived {
                None => i += 1,
                Some(facility) => {
                    self.paths.swap_remove(i);
                    let stay = rng.gen_range(60..400);
                    match facility {
                        Some(f) if self.try_park(f, tick + stay, garage_capacity) => {
                            events.push(FacilityEvent::parked(f));
                        }
                        _ => self.stats.turned_away += 1,
                    }
                }
            }
        }
        events
    }

    fn try_park(&mut self, facility: FacilityId, leaves_at: u64, garage_capacity: u32) -> bool {
        if facility == GARAGE {
            if self.occupancy >= garage_capacity {
                return false;
            }
            self.occupancy += 1;
        } else {
            let Some(free) = self.lane_free.get_mut(&facility) else {
                return false;
            };
            if *free < SLOT_LENGTH {
                return false;
            }
            *free -= SLOT_LENGTH;
        }
        self.parked.push((facility, leaves_at));
        self.stats.parked += 1;
        true
    }

    /// Parked cars whose stay is over drive away.
    pub fn depart(&mut self, tick: u64) {
        let (leaving, staying): (Vec<_>, Vec<_>) =
            self.parked.drain(..).partition(|&(_, leaves_at)| leaves_at <= tick);
        self.parked = staying;
        for (facility, _) in leaving {
            if facility == GARAGE {
                self.occupancy = self.occupancy.saturating_sub(1);
            } else if let Some(free) = self.lane_free.get_mut(&facility) {
                *free = (*free + SLOT_LENGTH).min(LANE_LENGTH);
            }
            self.stats.left += 1;
        }
    }

    /// The pathfinder invalidates paths whose target now looks full.
    pub fn mark_obsolete(&mut self, looks_full: impl Fn(FacilityId) -> bool) {
        for path in &mut self.paths {
            if let Some(target) = locate_parking_target(&path.elements) {
                if looks_full(target) {
                    path.flags.insert(PathFlags::OBSOLETE);
                }
            }
        }
    }

    pub fn obsolete(&self) -> Vec<usize> {
        self.paths
            .iter()
            .enumerate()
            .filter(|(_, p)| p.flags.contains(PathFlags::OBSOLETE))
            .map(|(i, _)| i)
            .collect()
    }

    /// Re-plan car `i` towards `target`.
    pub fn reroute(&mut self, i: usize, target: FacilityId) {
        let Some(path) = self.paths.get_mut(i) else {
            return;
        };
        for node in path.navigation.iter_mut().chain(path.elements.iter_mut()) {
            if node.kind.facility().is_some() {
                *node = target_node(target);
            }
        }
        path.flags.remove(PathFlags::OBSOLETE);
        path.flags.insert(PathFlags::UPDATED);
        self.stats.rerouted += 1;
    }
}
