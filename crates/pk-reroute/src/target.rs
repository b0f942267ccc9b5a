//! Locating the parking facility a fresh path leads to.

use pk_core::FacilityId;

use crate::{LaneKind, PathNode};

/// Find the parking facility in `path`.
///
/// A car's path is laid out as road lanes, then the parking lane, then the
/// walk from car to destination.  That ordering allows a binary search:
/// road → look later, non-road non-parking → look earlier.  Returns `None`
/// when the path contains no parking element (e.g. a through trip).
pub fn locate_parking_target(path: &[PathNode]) -> Option<FacilityId> {
    let mut low = 0usize;
    let mut high = path.len();

    while low < high {
        let mid = low + (high - low) / 2;
        match path[mid].kind {
            LaneKind::Road => low = mid + 1,
            LaneKind::Parking(f) | LaneKind::Garage(f) => return Some(f),
            LaneKind::Other => high = mid,
        }
    }
    None
}
