//! `pk-reroute`: gating of path invalidation by distance.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`path`]    | `PathNode`, `LaneKind`, `PathFlags`, `VehiclePath`                |
//! | [`horizon`] | `RerouteHorizonLimiter`, `HorizonDecision`                        |
//! | [`target`]  | `locate_parking_target`: binary search for the parking element   |
//!
//! # Ownership
//!
//! `VehiclePath` mirrors state owned by the host's navigation subsystem.  This
//! crate reads it and, under the conditions in [`horizon`], clears
//! [`PathFlags::OBSOLETE`]; it never sets flags or edits the buffers.

pub mod horizon;
pub mod path;
pub mod target;


pub use horizon::{HorizonDecision, RerouteHorizonLimiter};
pub use path::{LaneKind, PathFlags, PathNode, VehiclePath};
pub use target::locate_parking_target;
