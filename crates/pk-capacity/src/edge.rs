//! Pathfinding edge weights for garage connection lanes.

use crate::GarageCapacity;

/// The traversal parameters the graph builder assigns to a connection edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeSpecification {
    pub max_speed: f32,
    pub density:   f32,
}

impl EdgeSpecification {
    /// Near-zero traversal weight: the pathfinder will route through this
    /// edge only if nothing else reaches the destination.
    pub const DISCOURAGED: EdgeSpecification = EdgeSpecification { max_speed: 1.0, density: 0.0 };

    /// Discourage the edge when the garage is full once demand is counted.
    /// Returns `true` if the specification was changed.
    pub fn apply_garage_demand(&mut self, garage: &GarageCapacity) -> bool {
        if !garage.is_full_with_demand() {
            return false;
        }
        *self = Self::DISCOURAGED;
        true
    }

    #[inline]
    pub fn is_discouraged(&self) -> bool {
        *self == Self::DISCOURAGED
    }
}
