//! Thresholds derived from [`ParkingConfig`] and the bucket function.
//!
//! Demand only matters once it exceeds the tolerance, and then only in whole
//! steps of `size_per_spot`.  Two quantizations are used:
//!
//! - [`bucket`][DemandThresholds::bucket] (`ceil`) debounces refresh signals:
//!   the pathfinding graph is only rebuilt when demand moves to another bucket.
//! - [`penalty_spots`][DemandThresholds::penalty_spots] (`floor`) is the number
//!   of whole spots demand removes from a facility's apparent capacity.

use pk_core::{DecayPolicy, ParkingConfig};

/// The demand-related subset of the configuration, re-derived on every
/// configuration change.
///
/// Existing records are never rewritten when these change; a new tolerance
/// only affects bucket computations from the next tick on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DemandThresholds {
    pub enabled:         bool,
    pub tolerance:       i32,
    pub size_per_spot:   f32,
    pub cooldown_frames: u32,
    pub policy:          DecayPolicy,
}

impl DemandThresholds {
    /// Derive thresholds from an already validated configuration.
    pub fn from_config(config: &ParkingConfig) -> Self {
        Self {
            enabled:         config.enable_demand_system,
            tolerance:       config.demand_tolerance,
            size_per_spot:   config.demand_size_per_spot,
            cooldown_frames: config.cooldown_frames,
            policy:          config.decay_policy,
        }
    }

    /// `ceil((demand - tolerance) / size_per_spot)`, never below the bucket of
    /// zero demand (bucket 0).
    ///
    /// Every demand at or below the tolerance shares bucket 0, so fluctuations
    /// the pathfinder cannot observe never trigger a refresh.
    #[inline]
    pub fn bucket(&self, demand: i16) -> i32 {
        let excess = demand as i32 - self.tolerance;
        if excess <= 0 {
            return 0;
        }
        (excess as f64 / self.size_per_spot as f64).ceil() as i32
    }

    /// `floor((demand - tolerance) / size_per_spot)`, or 0 at or below the
    /// tolerance.
    #[inline]
    pub fn penalty_spots(&self, demand: i16) -> u32 {
        let excess = demand as i32 - self.tolerance;
        if excess <= 0 {
            return 0;
        }
        (excess as f64 / self.size_per_spot as f64).floor() as u32
    }
}

impl Default for DemandThresholds {
    fn default() -> Self {
        Self::from_config(&ParkingConfig::default())
    }
}
