//! `pk-sim`: per-tick orchestrator for parking demand.
//!
//! # Tick
//!
//! ```text
//! step(events, vehicles):
//!   ① Fresh paths : vehicles flagged UPDATED → locate parking target → Queued
//!   ② Aggregate   : count Queued/Parked per registered facility
//!   ③ Transitions : DemandUpdateEngine::transition for every facility with
//!                    events or a live record (parallel with `parallel`)
//!   ④ Commit      : merged MutationLog applied in ascending FacilityId order
//!   ⑤ Refresh     : drain RefreshSignals, sample oracle, project capacity
//!   ⑥ Horizon     : every reroute_check_interval ticks, gate OBSOLETE flags
//! ```
//!
//! Commit happens before any capacity read, so every projection in ⑤ sees
//! this tick's ledger.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Runs the transition phase on Rayon's thread pool.       |
//! | `fx-hash`  | FxHash for the demand ledger map.                       |
//! | `serde`    | Serde derives on config, records and facilities.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pk_capacity::{Facility, RawCapacity};
//! use pk_core::{FacilityId, ParkingConfig};
//! use pk_sim::{CapacityTable, FacilityEvent, NoopObserver, ParkingSimBuilder};
//!
//! let mut table = CapacityTable::new();
//! table.set(FacilityId(0), RawCapacity::Garage { occupancy: 0, vanilla_capacity: 10 });
//! let mut sim = ParkingSimBuilder::new(ParkingConfig::default(), table)
//!     .facilities([Facility::garage(FacilityId(0))])
//!     .build()?;
//! let report = sim.step(&[FacilityEvent::queued(FacilityId(0))], &mut [], &mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod oracle;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::ParkingSimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, ParkingObserver};
pub use oracle::{CapacityOracle, CapacityTable, EventKind, FacilityEvent};
pub use sim::{ParkingSim, TickReport};
