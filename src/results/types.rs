use serde::{Deserialize, Serialize};

use super::models::ResultRow;
use crate::league::{DriverId, RaceId};

/// One submitted result entry. Everything except the driver is optional and
/// defaults to "took part, scored nothing".
#[derive(Debug, Clone, Deserialize)]
pub struct ResultEntryRequest {
    pub driver_id: DriverId,
    pub position: Option<i32>,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub fastest_lap: bool,
    #[serde(default)]
    pub pole_position: bool,
    #[serde(default)]
    pub dnf: bool,
    #[serde(default)]
    pub dnf_reason: Option<String>,
    #[serde(default)]
    pub time_penalty_secs: i32,
    /// Normally zero on submission; penalties are applied separately. A
    /// non-zero value is still honored (and clamped) so re-submitting a
    /// previously penalized result set is idempotent.
    #[serde(default)]
    pub points_penalty: i32,
}

impl ResultEntryRequest {
    pub fn for_driver(driver_id: DriverId) -> Self {
        Self {
            driver_id,
            position: None,
            points: 0,
            fastest_lap: false,
            pole_position: false,
            dnf: false,
            dnf_reason: None,
            time_penalty_secs: 0,
            points_penalty: 0,
        }
    }
}

/// Request payload for replacing the full result set of a race.
#[derive(Debug, Deserialize)]
pub struct ReplaceResultsRequest {
    pub results: Vec<ResultEntryRequest>,
}

/// Response for result submission and result listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct RaceResultsResponse {
    pub race_id: RaceId,
    pub race_status: String,
    pub rows: Vec<ResultRow>,
}
