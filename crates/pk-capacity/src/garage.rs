//! Garage capacity scaling.

/// Apply the configured spots multiplier to a host garage capacity.
///
/// A garage always offers at least one spot, even when the host reports
/// zero capacity for it.
#[inline]
pub fn scaled_garage_capacity(vanilla_capacity: u32, multiplier: u32) -> u32 {
    vanilla_capacity.saturating_mul(multiplier).max(1)
}
