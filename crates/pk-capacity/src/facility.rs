//! Facility descriptors and raw oracle readings.

use pk_core::FacilityId;

/// Which effective-capacity formula applies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FacilityKind {
    /// Curbside parking measured in free curb length.
    RoadsideLane,
    /// A garage connection lane measured in vehicle count.
    GarageLane,
}

/// A registered facility.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Facility {
    pub id:   FacilityId,
    pub kind: FacilityKind,
}

impl Facility {
    pub fn roadside(id: FacilityId) -> Self {
        Self { id, kind: FacilityKind::RoadsideLane }
    }

    pub fn garage(id: FacilityId) -> Self {
        Self { id, kind: FacilityKind::GarageLane }
    }
}

/// One tick's reading from the capacity/occupancy oracle.
///
/// Computing these involves curve geometry and spatial queries in the host;
/// here they are plain inputs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RawCapacity {
    /// Free curb length in metres.
    Roadside { free_space: f32 },

    /// Vehicles currently inside and the host's unscaled capacity.
    Garage { occupancy: u32, vanilla_capacity: u32 },
}

impl RawCapacity {
    #[inline]
    pub fn kind(&self) -> FacilityKind {
        match self {
            RawCapacity::Roadside { .. } => FacilityKind::RoadsideLane,
            RawCapacity::Garage { .. } => FacilityKind::GarageLane,
        }
    }
}
