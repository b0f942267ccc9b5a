//! Pathfinding refresh signals.

use std::collections::BTreeSet;

use pk_core::FacilityId;

/// Facilities whose pathfinding edges must be recomputed.
///
/// Signalling the same facility twice before the graph builder drains the set
/// has the same effect as signalling it once.
#[derive(Default, Debug, Clone)]
pub struct RefreshSignals {
    pending: BTreeSet<FacilityId>,
}

impl RefreshSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a refresh.  Returns `false` if one was already pending.
    #[inline]
    pub fn signal(&mut self, facility: FacilityId) -> bool {
        self.pending.insert(facility)
    }

    #[inline]
    pub fn is_pending(&self, facility: FacilityId) -> bool {
        self.pending.contains(&facility)
    }

    /// Hand every pending facility to the graph builder, ascending by id.
    pub fn drain(&mut self) -> Vec<FacilityId> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
