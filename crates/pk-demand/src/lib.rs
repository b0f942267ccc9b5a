//! `pk-demand`: induced parking demand accounting.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`record`]     | `DemandRecord`: demand counter + cooldown start frame          |
//! | [`ledger`]     | `DemandLedger`: sparse `FacilityId → DemandRecord` map         |
//! | [`thresholds`] | `DemandThresholds`: tolerance, buckets, penalty spots          |
//! | [`engine`]     | `DemandUpdateEngine`: the per-facility transition function     |
//! | [`mutation`]   | `LedgerMutation`, `MutationLog`: deferred ledger writes        |
//! | [`refresh`]    | `RefreshSignals`: idempotent pathfinding refresh requests      |
//!
//! # Two-phase update
//!
//! 1. **Transition phase** (parallel-safe): for every facility with events or
//!    a live record, [`DemandUpdateEngine::transition`] reads the ledger and
//!    returns a [`Transition`] without mutating it.
//! 2. **Commit phase** (serial): transitions are collected into a
//!    [`MutationLog`], sorted by facility and applied to the ledger in one
//!    pass.  Refresh requests land in [`RefreshSignals`].
//!
//! A facility's events are only ever seen by one transition per tick, so the
//! parallel workers can never disagree about a ledger entry.

pub mod engine;
pub mod ledger;
pub mod mutation;
pub mod record;
pub mod refresh;
pub mod thresholds;


pub use engine::{DECAY_FACTOR, DemandUpdateEngine, FacilityEvents, Transition};
pub use ledger::DemandLedger;
pub use mutation::{CommitSummary, LedgerMutation, MutationLog};
pub use record::DemandRecord;
pub use refresh::RefreshSignals;
pub use thresholds::DemandThresholds;
