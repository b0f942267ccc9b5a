//! `RerouteHorizonLimiter`: hides far-away path invalidations.
//!
//! When the pathfinder marks a vehicle's path obsolete because its parking
//! target filled up, the vehicle would normally U-turn on the spot, even if
//! the target is kilometres away.  The limiter looks `reroute_limit` nodes
//! ahead: if that node is still a plain road, the vehicle could not yet "see"
//! the facility, so the obsolete flag is cleared for this check.  The host
//! sets it again on its next pass, and once the vehicle is close enough the
//! flag is left alone.

use pk_core::ParkingConfig;
use tracing::trace;

use crate::{PathFlags, VehiclePath};

/// Outcome of one horizon check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HorizonDecision {
    /// Limiter switched off; the obsolete flag always propagates.
    Disabled,
    /// Buffers not populated or inconsistent; skipped this tick.
    NotReady,
    /// Fewer than `reroute_limit` nodes remain; the condition is in range.
    WithinHorizon,
    /// The node at the horizon is not a road (a parking or pedestrian node),
    /// so the path end is in view.
    TargetInView,
    /// The horizon node is a road: hide the obsolete flag.
    Suppress,
}

impl HorizonDecision {
    #[inline]
    pub fn suppresses(self) -> bool {
        self == HorizonDecision::Suppress
    }
}

/// Per-vehicle horizon check.  Stateless apart from its settings, so repeated
/// checks on an unchanged path always agree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RerouteHorizonLimiter {
    enabled: bool,
    limit:   u32,
}

impl RerouteHorizonLimiter {
    pub fn new(enabled: bool, limit: u32) -> Self {
        Self { enabled, limit }
    }

    pub fn from_config(config: &ParkingConfig) -> Self {
        Self::new(config.enable_reroute_limit, config.reroute_limit)
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Decide without touching the path.  A path with a pathfind request in
    /// flight ([`PathFlags::PENDING`]) is not ready: its buffers are about to
    /// be replaced.
    pub fn evaluate(&self, path: &VehiclePath) -> HorizonDecision {
        if !self.enabled {
            return HorizonDecision::Disabled;
        }
        if self.limit == 0 || path.navigation.is_empty() || path.flags.contains(PathFlags::PENDING) {
            return HorizonDecision::NotReady;
        }
        let Some(remaining) = path.remaining() else {
            return HorizonDecision::NotReady;
        };
        let limit = self.limit as usize;
        if remaining < limit {
            return HorizonDecision::WithinHorizon;
        }
        match path.node_ahead(limit) {
            Some(node) if node.kind.is_road() => HorizonDecision::Suppress,
            Some(_) => HorizonDecision::TargetInView,
            None => HorizonDecision::NotReady,
        }
    }

    /// Evaluate and, on [`HorizonDecision::Suppress`], clear
    /// [`PathFlags::OBSOLETE`].  Returns the decision and whether a set flag
    /// was actually cleared.
    pub fn check(&self, path: &mut VehiclePath) -> (HorizonDecision, bool) {
        let decision = self.evaluate(path);
        let cleared = decision.suppresses() && path.flags.contains(PathFlags::OBSOLETE);
        if cleared {
            path.flags.remove(PathFlags::OBSOLETE);
            trace!(vehicle = %path.vehicle, limit = self.limit, "obsolete path hidden beyond horizon");
        }
        (decision, cleared)
    }
}
