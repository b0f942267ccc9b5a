//! `pk-capacity`: effective capacity exposed to the pathfinder.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                          |
//! |---------------|-------------------------------------------------------------------|
//! | [`facility`]  | `Facility`, `FacilityKind`, `RawCapacity` (oracle output)         |
//! | [`projector`] | `CapacityProjector`: roadside free space / garage occupancy      |
//! | [`garage`]    | garage capacity scaling                                           |
//! | [`edge`]      | `EdgeSpecification`: garage connection edge discouragement       |
//!
//! # Two signals
//!
//! Roadside lanes get a *soft* signal: demand shortens the free curb length
//! the pathfinder sees, but never to zero.  Garages get a *hard* one: demand
//! inflates the apparent vehicle count, and once that count reaches capacity
//! the connection edge is made nearly impassable.

pub mod edge;
pub mod facility;
pub mod garage;
pub mod projector;


pub use edge::EdgeSpecification;
pub use facility::{Facility, FacilityKind, RawCapacity};
pub use garage::scaled_garage_capacity;
pub use projector::{
    CapacityProjector, EffectiveCapacity, FREE_SPACE_EPSILON, GarageCapacity,
    MIN_VIABLE_FREE_SPACE, Projection,
};
