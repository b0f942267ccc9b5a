//! User-facing configuration.
//!
//! `ParkingConfig` is loaded once at startup and replaced wholesale when the
//! player applies new settings.  It is validated on every load through
//! [`ParkingConfig::validate`]; nothing downstream re-checks it per tick.
//!
//! Typically deserialized by the host (with the `serde` feature) and handed to
//! a [`ConfigHub`][crate::ConfigHub].

use crate::{PkError, PkResult};

/// How accumulated demand drains once the cooldown window passes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecayPolicy {
    /// Demand shrinks by `max(1, floor(demand * 0.1))` per elapsed cooldown
    /// window until it reaches zero.
    #[default]
    Proportional,

    /// Demand grows until a full cooldown window passes without a queued
    /// vehicle, then the record is dropped outright.
    HardReset,
}

/// Settings for the demand system and the reroute horizon.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkingConfig {
    /// Master switch for induced parking demand.
    pub enable_demand_system: bool,

    /// Routing attempts absorbed for free before demand affects capacity.
    /// Must be `>= 0`.
    pub demand_tolerance: i32,

    /// Extra routing attempts per lost parking spot.  Must be finite and `> 0`.
    pub demand_size_per_spot: f32,

    /// Frames without a fresh queued vehicle before demand starts to drain.
    pub cooldown_frames: u32,

    pub decay_policy: DecayPolicy,

    /// When `false` the host's unrestricted horizon applies.
    pub enable_reroute_limit: bool,

    /// Path-graph nodes within which a vehicle may perceive that its parking
    /// target became unavailable.  Must be `>= 1` when the limit is enabled.
    pub reroute_limit: u32,

    /// Run the horizon check every N ticks.  Must be `>= 1`.
    pub reroute_check_interval: u32,

    /// Multiplier applied to the host's vanilla garage capacity.  Must be `>= 1`.
    pub garage_spots_multiplier: u32,

    /// Curb length of one parking slot on a roadside lane, in metres.
    pub unit_slot_length: f32,
}

impl Default for ParkingConfig {
    fn default() -> Self {
        Self {
            enable_demand_system:    true,
            demand_tolerance:        6,
            demand_size_per_spot:    3.0,
            cooldown_frames:         1_000,
            decay_policy:            DecayPolicy::Proportional,
            enable_reroute_limit:    true,
            reroute_limit:           6,
            reroute_check_interval:  4,
            garage_spots_multiplier: 1,
            unit_slot_length:        6.0,
        }
    }
}

impl ParkingConfig {
    /// Reject configurations that would divide by zero or index out of range
    /// at runtime.
    pub fn validate(&self) -> PkResult<()> {
        if self.demand_tolerance < 0 {
            return Err(PkError::Config(format!(
                "demand_tolerance must be >= 0, got {}",
                self.demand_tolerance
            )));
        }
        if !(self.demand_size_per_spot.is_finite() && self.demand_size_per_spot > 0.0) {
            return Err(PkError::Config(format!(
                "demand_size_per_spot must be a finite value > 0, got {}",
                self.demand_size_per_spot
            )));
        }
        if self.enable_reroute_limit && self.reroute_limit == 0 {
            return Err(PkError::Config(
                "reroute_limit must be >= 1 while the reroute limit is enabled".into(),
            ));
        }
        if self.reroute_check_interval == 0 {
            return Err(PkError::Config("reroute_check_interval must be >= 1".into()));
        }
        if self.garage_spots_multiplier == 0 {
            return Err(PkError::Config("garage_spots_multiplier must be >= 1".into()));
        }
        if !(self.unit_slot_length.is_finite() && self.unit_slot_length > 0.0) {
            return Err(PkError::Config(format!(
                "unit_slot_length must be a finite value > 0, got {}",
                self.unit_slot_length
            )));
        }
        Ok(())
    }
}
