//! `pk-core`: foundational types for the parking demand engine.
//!
//! This crate is a dependency of every other `pk-*` crate.  It has no `pk-*`
//! dependencies and only `thiserror` and `tracing` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `FacilityId`, `VehicleId`, `LaneId`                       |
//! | [`time`]    | `Frame`, `FrameClock`                                     |
//! | [`config`]  | `ParkingConfig`, `DecayPolicy`                            |
//! | [`hub`]     | `ConfigHub`: owns the active config, notifies listeners  |
//! | [`error`]   | `PkError`, `PkResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod hub;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DecayPolicy, ParkingConfig};
pub use error::{PkError, PkResult};
pub use hub::{ConfigHub, ListenerId};
pub use ids::{FacilityId, LaneId, VehicleId};
pub use time::{Frame, FrameClock};
