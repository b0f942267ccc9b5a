//! Simulation frame counter.
//!
//! The host advances a `u32` frame index once per simulation step.  Cooldown
//! windows are measured in frames, so all comparisons are exact integer
//! arithmetic.  Sums are widened to `u64` so a cooldown deadline near
//! `u32::MAX` never wraps around to "already expired".

use std::fmt;

// ── Frame ─────────────────────────────────────────────────────────────────────

/// An absolute simulation frame index.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame(pub u32);

impl Frame {
    pub const ZERO: Frame = Frame(0);

    /// Frames elapsed from `earlier` to `self`, or 0 if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Frame) -> u32 {
        self.0.saturating_sub(earlier.0)
    }

    /// `true` once at least `window` frames have passed since `start`.
    ///
    /// A `start` in the future (e.g. a record restored from a save taken at a
    /// later frame) never counts as elapsed.
    #[inline]
    pub fn has_elapsed(self, start: Frame, window: u32) -> bool {
        self.0 as u64 >= start.0 as u64 + window as u64
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

// ── FrameClock ────────────────────────────────────────────────────────────────

/// Monotonic frame counter plus a count of processed ticks.
///
/// The host may step several frames per tick (simulation speed), so the tick
/// counter is tracked separately; it drives throttled work such as the
/// every-4th-tick horizon check.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameClock {
    pub current: Frame,
    pub ticks:   u64,
}

impl FrameClock {
    pub fn new(start: Frame) -> Self {
        Self { current: start, ticks: 0 }
    }

    /// Advance by `frames` frames and count one tick.
    ///
    /// Saturates at `u32::MAX` rather than wrapping back to frame 0.
    #[inline]
    pub fn advance(&mut self, frames: u32) {
        self.current = Frame(self.current.0.saturating_add(frames));
        self.ticks += 1;
    }

    /// `true` on every `interval`-th tick, starting with tick 0.
    #[inline]
    pub fn is_tick_multiple_of(&self, interval: u32) -> bool {
        interval > 0 && self.ticks.is_multiple_of(interval as u64)
    }
}

impl fmt::Display for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tick {})", self.current, self.ticks)
    }
}
