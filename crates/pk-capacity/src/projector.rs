//! `CapacityProjector`: raw capacity + demand → effective capacity.

use pk_core::ParkingConfig;
use pk_demand::{DemandRecord, DemandThresholds};
use tracing::trace;

use crate::{RawCapacity, scaled_garage_capacity};

/// Smallest free curb length a lane with real space may report.
pub const FREE_SPACE_EPSILON: f32 = 0.01;

/// Below this much raw free curb length (metres) a lane has no viable slot
/// left and tracking demand for it is pointless.
pub const MIN_VIABLE_FREE_SPACE: f32 = 2.0;

/// Garage occupancy as seen by the pathfinder and by arriving vehicles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GarageCapacity {
    /// Vehicles physically inside.
    pub actual:            u32,
    /// Occupancy with demand folded in, within `[actual, max(actual, capacity)]`.
    pub effective:         u32,
    /// Scaled vehicle capacity.
    pub capacity:          u32,
    /// Set only when demand raised the count above `actual`.  The graph
    /// builder compares this against `capacity` to deny routing outright.
    pub count_with_demand: Option<u32>,
}

impl GarageCapacity {
    /// Whether the pathfinder should treat the garage as full.
    #[inline]
    pub fn is_full_with_demand(&self) -> bool {
        self.count_with_demand.unwrap_or(self.actual) >= self.capacity
    }

    /// Whether a vehicle that already arrived can still get in.  Uses the
    /// physical count; demand only steers routing.
    #[inline]
    pub fn has_room_on_arrival(&self) -> bool {
        self.actual < self.capacity
    }
}

/// Capacity exposed to the pathfinding graph builder.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EffectiveCapacity {
    Roadside { free_space: f32 },
    Garage(GarageCapacity),
}

/// Result of projecting one facility.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub effective:   EffectiveCapacity,
    /// The facility's demand record should be dropped (lane has no viable
    /// capacity).  A corrective cleanup, applied through the mutation log.
    pub drop_record: bool,
}

/// Pure projection of demand onto capacity.
#[derive(Copy, Clone, Debug)]
pub struct CapacityProjector {
    thresholds:       DemandThresholds,
    unit_slot_length: f32,
    garage_multiplier: u32,
}

impl CapacityProjector {
    pub fn new(thresholds: DemandThresholds, unit_slot_length: f32, garage_multiplier: u32) -> Self {
        Self { thresholds, unit_slot_length, garage_multiplier }
    }

    pub fn from_config(config: &ParkingConfig) -> Self {
        Self::new(
            DemandThresholds::from_config(config),
            config.unit_slot_length,
            config.garage_spots_multiplier,
        )
    }

    #[inline]
    pub fn garage_multiplier(&self) -> u32 {
        self.garage_multiplier
    }

    /// Project a raw oracle reading.
    pub fn project(&self, raw: RawCapacity, record: Option<DemandRecord>) -> Projection {
        match raw {
            RawCapacity::Roadside { free_space } => {
                let (free_space, drop_record) = self.roadside(free_space, record);
                Projection {
                    effective: EffectiveCapacity::Roadside { free_space },
                    drop_record,
                }
            }
            RawCapacity::Garage { occupancy, vanilla_capacity } => Projection {
                effective:   EffectiveCapacity::Garage(self.garage(occupancy, vanilla_capacity, record)),
                drop_record: false,
            },
        }
    }

    /// Effective free curb length for a roadside lane.
    ///
    /// Returns `(free_space, drop_record)`.  Demand above the tolerance
    /// removes one `unit_slot_length` per penalty spot, but a lane that still
    /// has positive raw space always keeps at least [`FREE_SPACE_EPSILON`].
    pub fn roadside(&self, raw_free_space: f32, record: Option<DemandRecord>) -> (f32, bool) {
        let t = &self.thresholds;
        let Some(record) = record.filter(|_| t.enabled) else {
            return (raw_free_space, false);
        };
        if raw_free_space < MIN_VIABLE_FREE_SPACE {
            trace!(raw_free_space, demand = record.demand, "no viable curb space; record marked for drop");
            return (raw_free_space, true);
        }

        let spots = t.penalty_spots(record.demand);
        if spots == 0 {
            return (raw_free_space, false);
        }
        let penalty = spots as f32 * self.unit_slot_length;
        let free = raw_free_space - penalty.min(raw_free_space - FREE_SPACE_EPSILON);
        (free.max(FREE_SPACE_EPSILON), false)
    }

    /// Effective occupancy for a garage lane.
    ///
    /// Demand can make a garage look fuller than it is, up to its capacity,
    /// never emptier.
    pub fn garage(&self, occupancy: u32, vanilla_capacity: u32, record: Option<DemandRecord>) -> GarageCapacity {
        let capacity = scaled_garage_capacity(vanilla_capacity, self.garage_multiplier);
        let extra = match record {
            Some(r) if self.thresholds.enabled => self.thresholds.penalty_spots(r.demand),
            _ => 0,
        };
        let effective = occupancy.saturating_add(extra).min(capacity.max(occupancy));

        GarageCapacity {
            actual: occupancy,
            effective,
            capacity,
            count_with_demand: (effective > occupancy).then_some(effective),
        }
    }
}
