//! Vehicle path buffers as exposed by the navigation subsystem.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use pk_core::{FacilityId, LaneId, VehicleId};

/// What kind of lane a path node traverses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// A plain car lane.
    Road,
    /// A roadside parking lane.
    Parking(FacilityId),
    /// A garage connection lane.
    Garage(FacilityId),
    /// Anything else (pedestrian, transit, area connections).
    Other,
}

impl LaneKind {
    /// The facility this lane belongs to, if it is a parking facility.
    #[inline]
    pub fn facility(self) -> Option<FacilityId> {
        match self {
            LaneKind::Parking(f) | LaneKind::Garage(f) => Some(f),
            LaneKind::Road | LaneKind::Other => None,
        }
    }

    #[inline]
    pub fn is_road(self) -> bool {
        matches!(self, LaneKind::Road)
    }
}

/// One node of either the lookahead buffer or the full path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathNode {
    pub lane: LaneId,
    pub kind: LaneKind,
}

impl PathNode {
    pub fn new(lane: LaneId, kind: LaneKind) -> Self {
        Self { lane, kind }
    }

    pub fn road(lane: u32) -> Self {
        Self::new(LaneId(lane), LaneKind::Road)
    }
}

/// Path state bits owned by the navigation subsystem.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathFlags(u8);

impl PathFlags {
    pub const EMPTY:    PathFlags = PathFlags(0);
    /// The path was invalidated and the vehicle should reroute.
    pub const OBSOLETE: PathFlags = PathFlags(1 << 0);
    /// The pathfinder delivered a fresh path this frame.
    pub const UPDATED:  PathFlags = PathFlags(1 << 1);
    /// A pathfind request is in flight.
    pub const PENDING:  PathFlags = PathFlags(1 << 2);

    #[inline]
    pub fn contains(self, other: PathFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: PathFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: PathFlags) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for PathFlags {
    type Output = PathFlags;
    fn bitor(self, rhs: PathFlags) -> PathFlags {
        PathFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for PathFlags {
    fn bitor_assign(&mut self, rhs: PathFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for PathFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        for (flag, name) in [
            (PathFlags::OBSOLETE, "OBSOLETE"),
            (PathFlags::UPDATED, "UPDATED"),
            (PathFlags::PENDING, "PENDING"),
        ] {
            if self.contains(flag) {
                names.push(name);
            }
        }
        write!(f, "PathFlags({})", names.join(" | "))
    }
}

/// A vehicle's path as the core sees it.
///
/// `navigation` is the near-term lookahead the vehicle is already steering
/// along; `elements[element_index..]` is the rest of the planned path.
#[derive(Clone, Debug, Default)]
pub struct VehiclePath {
    pub vehicle:       VehicleId,
    pub elements:      Vec<PathNode>,
    pub element_index: usize,
    pub navigation:    Vec<PathNode>,
    pub flags:         PathFlags,
}

impl VehiclePath {
    pub fn new(vehicle: VehicleId) -> Self {
        Self { vehicle, ..Default::default() }
    }

    /// Nodes left to traverse: lookahead plus the unconsumed path.  `None`
    /// when the buffers are inconsistent.
    #[inline]
    pub fn remaining(&self) -> Option<usize> {
        let rest = self.elements.len().checked_sub(self.element_index)?;
        Some(self.navigation.len() + rest)
    }

    /// The node `offset` steps ahead (1-based) across both buffers.
    pub fn node_ahead(&self, offset: usize) -> Option<PathNode> {
        let i = offset.checked_sub(1)?;
        if let Some(node) = self.navigation.get(i) {
            return Some(*node);
        }
        let past_lookahead = i - self.navigation.len();
        self.elements.get(self.element_index.checked_add(past_lookahead)?).copied()
    }
}
