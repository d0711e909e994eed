use serde::{Deserialize, Serialize};

use crate::league::{DriverId, RaceId};

/// One persisted result entry, keyed by (race, driver).
///
/// `raw_points` is the admin-entered score and never changes after
/// submission; `points_penalty` is mutated by the penalty ledger.
/// `effective_points` is maintained at every write as
/// `max(0, raw_points - points_penalty)` so the aggregator can sum it
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub race_id: RaceId,
    pub driver_id: DriverId,
    /// None means unclassified (typically a DNF).
    pub position: Option<i32>,
    pub raw_points: i32,
    pub points_penalty: i32,
    pub effective_points: i32,
    pub fastest_lap: bool,
    pub pole_position: bool,
    pub dnf: bool,
    pub dnf_reason: Option<String>,
    /// Informational only; never affects points.
    pub time_penalty_secs: i32,
}

impl ResultRow {
    /// The clamp applied at every write to a row's point fields.
    pub fn clamped_points(raw_points: i32, points_penalty: i32) -> i32 {
        (raw_points - points_penalty).max(0)
    }

    /// Re-derives `effective_points` after a penalty mutation.
    pub fn recompute_effective_points(&mut self) {
        self.effective_points = Self::clamped_points(self.raw_points, self.points_penalty);
    }

    pub fn is_classified(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_win(&self) -> bool {
        self.position == Some(1)
    }
}
