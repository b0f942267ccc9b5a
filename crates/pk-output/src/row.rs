//! Plain data row types written by output backends.

use serde::Serialize;

/// One live demand record at a snapshot frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemandSnapshotRow {
    pub facility_id:          u32,
    pub frame:                u32,
    pub demand:               i16,
    pub cooldown_start_frame: u32,
}

/// Capacity handed to the graph builder for one refreshed facility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RefreshRow {
    pub frame:            u32,
    pub facility_id:      u32,
    /// `roadside` or `garage`.
    pub kind:             &'static str,
    /// Free curb length (roadside) or occupancy with demand (garage).
    pub effective:        f32,
    /// Scaled vehicle capacity; empty for roadside lanes.
    pub capacity:         Option<u32>,
    /// Garage edge is discouraged; always `false` for roadside lanes.
    pub full_with_demand: bool,
    pub drop_record:      bool,
}

/// Summary statistics for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickSummaryRow {
    pub frame:            u32,
    pub events:           u64,
    pub skipped_events:   u64,
    pub evaluated:        u64,
    pub upserts:          u64,
    pub removals:         u64,
    pub refreshed:        u64,
    pub corrective_drops: u64,
    pub suppressed:       u64,
}
