//! The per-facility demand transition.

use pk_core::{DecayPolicy, FacilityId, Frame};

use crate::{DemandRecord, DemandThresholds, LedgerMutation};

/// Fraction of current demand drained per elapsed cooldown window
/// (proportional policy).  At least one unit always drains.
pub const DECAY_FACTOR: f32 = 0.1;

/// Events aggregated for one facility over one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FacilityEvents {
    /// Vehicles that selected this facility as their parking target.
    pub queued: u16,
    /// Vehicles that parked here (and left the queue).
    pub parked: u16,
}

impl FacilityEvents {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queued == 0 && self.parked == 0
    }
}

/// The outcome of one facility's transition.  Pure data: nothing is applied
/// until the commit step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub facility: FacilityId,
    /// Ledger write to perform at commit, if any.
    pub mutation: Option<LedgerMutation>,
    /// Whether the pathfinding graph must re-evaluate this facility.
    pub refresh:  bool,
}

impl Transition {
    #[inline]
    fn unchanged(facility: FacilityId) -> Self {
        Self { facility, mutation: None, refresh: false }
    }
}

/// Evaluates the demand state machine for one facility at a time.
///
/// Holds only the current [`DemandThresholds`], so it is `Copy`, `Sync`, and
/// can be shared freely across worker threads.
#[derive(Copy, Clone, Debug, Default)]
pub struct DemandUpdateEngine {
    thresholds: DemandThresholds,
}

impl DemandUpdateEngine {
    pub fn new(thresholds: DemandThresholds) -> Self {
        Self { thresholds }
    }

    #[inline]
    pub fn thresholds(&self) -> &DemandThresholds {
        &self.thresholds
    }

    /// Swap in re-derived thresholds after a configuration change.
    pub fn set_thresholds(&mut self, thresholds: DemandThresholds) {
        self.thresholds = thresholds;
    }

    /// Compute the transition for `facility` given its current record and this
    /// tick's events.  Total: every input produces a transition.
    ///
    /// Queued events apply before parked ones, so one of each in the same tick
    /// nets to no change in demand.
    pub fn transition(
        &self,
        facility: FacilityId,
        old:      Option<DemandRecord>,
        events:   FacilityEvents,
        now:      Frame,
    ) -> Transition {
        let t = &self.thresholds;

        // Disabled: tear down any record and let the graph forget the penalty.
        if !t.enabled {
            return match old {
                Some(_) => Transition {
                    facility,
                    mutation: Some(LedgerMutation::Remove { facility }),
                    refresh:  true,
                },
                None => Transition::unchanged(facility),
            };
        }

        let existed = old.is_some();
        let base = old.unwrap_or_else(|| DemandRecord::baseline(now));
        let mut demand = base.demand as i32;
        let mut reset_clock = false;

        if events.queued > 0 {
            demand += events.queued as i32;
            reset_clock = true;
        }
        demand -= events.parked as i32;

        let cooldown_over = base.cooldown_elapsed(now, t.cooldown_frames);
        match t.policy {
            DecayPolicy::Proportional => {
                if base.demand != 0 && cooldown_over {
                    let step = ((demand.max(0) as f32 * DECAY_FACTOR).floor() as i32).max(1);
                    demand -= step;
                    reset_clock = true;
                }
            }
            DecayPolicy::HardReset => {
                if existed && events.queued == 0 && cooldown_over {
                    return Transition {
                        facility,
                        mutation: Some(LedgerMutation::Remove { facility }),
                        refresh:  true,
                    };
                }
            }
        }

        let demand = demand.clamp(0, i16::MAX as i32) as i16;
        let mut refresh = t.bucket(demand) != t.bucket(base.demand);

        let mutation = if demand == 0 && !reset_clock && existed {
            // Settled at baseline: drop the record and refresh exactly once.
            refresh = true;
            Some(LedgerMutation::Remove { facility })
        } else if demand != base.demand || (existed && reset_clock) {
            let cooldown_start = if reset_clock { now } else { base.cooldown_start };
            Some(LedgerMutation::Upsert {
                facility,
                record: DemandRecord::new(demand, cooldown_start),
            })
        } else {
            None
        };

        Transition { facility, mutation, refresh }
    }
}
