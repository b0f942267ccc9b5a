//! `DemandLedger`: the sparse facility → record store.

use pk_core::{FacilityId, Frame};

use crate::{DemandRecord, LedgerMutation};

#[cfg(feature = "fx-hash")]
type RecordMap = rustc_hash::FxHashMap<FacilityId, DemandRecord>;
#[cfg(not(feature = "fx-hash"))]
type RecordMap = std::collections::HashMap<FacilityId, DemandRecord>;

/// Session-scoped storage of every live [`DemandRecord`].
///
/// Most facilities never see demand, so the map only holds the handful that
/// do.  Presence is a first-class query: `get` returns `None` for baseline
/// facilities and that is never an error.
///
/// Writes come from the serial commit step of the two-phase tick; the ledger
/// itself does no locking.
#[derive(Default, Debug)]
pub struct DemandLedger {
    records: RecordMap,
}

impl DemandLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for `facility`, or `None` at baseline.
    #[inline]
    pub fn get(&self, facility: FacilityId) -> Option<DemandRecord> {
        self.records.get(&facility).copied()
    }

    /// Insert or overwrite the record for `facility`.
    ///
    /// Negative `demand` is clamped to zero.  Returns the previous record.
    pub fn upsert(
        &mut self,
        facility:       FacilityId,
        demand:         i16,
        cooldown_start: Frame,
    ) -> Option<DemandRecord> {
        self.records.insert(facility, DemandRecord::new(demand, cooldown_start))
    }

    /// Drop the record for `facility`, returning it if present.
    pub fn remove(&mut self, facility: FacilityId) -> Option<DemandRecord> {
        self.records.remove(&facility)
    }

    /// Apply one deferred mutation.
    pub fn apply(&mut self, mutation: &LedgerMutation) {
        match *mutation {
            LedgerMutation::Upsert { facility, record } => {
                self.upsert(facility, record.demand, record.cooldown_start);
            }
            LedgerMutation::Remove { facility } => {
                self.remove(facility);
            }
        }
    }

    /// Every facility with a live record, in ascending id order.
    ///
    /// Sorted so tick processing is deterministic regardless of hash order.
    pub fn facilities(&self) -> Vec<FacilityId> {
        let mut ids: Vec<FacilityId> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate `(facility, record)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (FacilityId, DemandRecord)> + '_ {
        self.records.iter().map(|(&f, &r)| (f, r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
