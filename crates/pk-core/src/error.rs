//! Framework error type.
//!
//! Per-tick code in this workspace is total: it never returns errors.  The
//! only fallible operations are configuration validation and facility
//! registration, which happen outside the tick loop.

use thiserror::Error;

use crate::FacilityId;

/// The top-level error type for `pk-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum PkError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("facility {0} not found")]
    FacilityNotFound(FacilityId),

    #[error("facility {0} registered twice")]
    DuplicateFacility(FacilityId),
}

/// Shorthand result type for all `pk-*` crates.
pub type PkResult<T> = Result<T, PkError>;
