//! Deferred ledger writes.
//!
//! Workers in the transition phase never touch the ledger.  Each one fills
//! its own [`MutationLog`]; logs are merged at the synchronization point and
//! committed serially, in ascending facility order, by
//! [`MutationLog::commit`].

use pk_core::FacilityId;
use tracing::trace;

use crate::{DemandLedger, DemandRecord, RefreshSignals, Transition};

/// One intended write to the [`DemandLedger`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LedgerMutation {
    Upsert { facility: FacilityId, record: DemandRecord },
    Remove { facility: FacilityId },
}

impl LedgerMutation {
    #[inline]
    pub fn facility(&self) -> FacilityId {
        match *self {
            LedgerMutation::Upsert { facility, .. } | LedgerMutation::Remove { facility } => facility,
        }
    }
}

/// Counts reported by [`MutationLog::commit`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub upserts:   usize,
    pub removals:  usize,
    /// Facilities newly signalled for refresh by this commit.
    pub refreshes: usize,
}

/// A per-worker buffer of mutations and refresh requests.
#[derive(Debug, Default, Clone)]
pub struct MutationLog {
    mutations: Vec<LedgerMutation>,
    refresh:   Vec<FacilityId>,
}

impl MutationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transition's effects.
    pub fn push(&mut self, transition: Transition) {
        if let Some(m) = transition.mutation {
            self.mutations.push(m);
        }
        if transition.refresh {
            self.refresh.push(transition.facility);
        }
    }

    /// Queue a mutation that did not come from a transition (corrective
    /// cleanups during capacity projection).
    pub fn push_mutation(&mut self, mutation: LedgerMutation) {
        self.mutations.push(mutation);
    }

    /// Fold another worker's log into this one.
    pub fn merge(mut self, mut other: MutationLog) -> MutationLog {
        self.mutations.append(&mut other.mutations);
        self.refresh.append(&mut other.refresh);
        self
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty() && self.refresh.is_empty()
    }

    /// Apply every mutation to `ledger` and raise refresh signals.
    ///
    /// Mutations are applied in ascending facility order (stable within a
    /// facility), so the result does not depend on how work was split between
    /// workers.
    pub fn commit(mut self, ledger: &mut DemandLedger, signals: &mut RefreshSignals) -> CommitSummary {
        self.mutations.sort_by_key(LedgerMutation::facility);

        let mut summary = CommitSummary::default();
        for m in &self.mutations {
            match m {
                LedgerMutation::Upsert { .. } => summary.upserts += 1,
                LedgerMutation::Remove { facility } => {
                    trace!(facility = %facility, "demand record removed");
                    summary.removals += 1;
                }
            }
            ledger.apply(m);
        }
        for facility in self.refresh {
            if signals.signal(facility) {
                summary.refreshes += 1;
            }
        }
        summary
    }
}
