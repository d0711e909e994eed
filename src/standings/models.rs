use serde::{Deserialize, Serialize};

use crate::league::{DriverId, SeasonId, TeamId};

/// Derived ranking entry for one driver. Never persisted; recomputed from
/// result-row history on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStanding {
    pub driver_id: DriverId,
    pub driver_name: String,
    pub driver_number: Option<i32>,
    pub team_name: Option<String>,
    pub total_points: i32,
    pub wins: u32,
    pub poles: u32,
    pub fastest_laps: u32,
    pub dnfs: u32,
    /// Mean of classified finishing positions only; None when the driver
    /// has no classified finish in the season.
    pub avg_position: Option<f64>,
}

/// Derived ranking entry for one team, grouped by each driver's current
/// team assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub team_name: String,
    pub total_points: i32,
    pub wins: u32,
    pub poles: u32,
    pub fastest_laps: u32,
    pub driver_count: u32,
}

/// Combined payload for the standings page.
#[derive(Debug, Serialize, Deserialize)]
pub struct StandingsResponse {
    pub season_id: SeasonId,
    pub drivers: Vec<DriverStanding>,
    pub teams: Vec<TeamStanding>,
}
