//! The per-facility demand record.

use pk_core::Frame;

/// Demand state for one facility.
///
/// A record only exists while the facility has non-baseline demand or is
/// still inside its cooldown window; absence means "no demand".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DemandRecord {
    /// Vehicles routed here recently.  Never negative once stored.
    pub demand: i16,

    /// Frame of the most recent cooldown reset (queued vehicle or decay step).
    pub cooldown_start: Frame,
}

impl DemandRecord {
    /// Build a record, clamping `demand` at zero.
    #[inline]
    pub fn new(demand: i16, cooldown_start: Frame) -> Self {
        Self { demand: demand.max(0), cooldown_start }
    }

    /// The baseline a facility starts from on its first event.
    #[inline]
    pub fn baseline(now: Frame) -> Self {
        Self { demand: 0, cooldown_start: now }
    }

    /// `true` once `cooldown_frames` have passed since the last reset.
    #[inline]
    pub fn cooldown_elapsed(&self, now: Frame, cooldown_frames: u32) -> bool {
        now.has_elapsed(self.cooldown_start, cooldown_frames)
    }
}
