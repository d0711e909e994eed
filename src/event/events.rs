use serde::{Deserialize, Serialize};

use crate::league::{DriverId, RaceId, SeasonId};
use crate::penalties::PenaltyId;

/// Events that can occur in the league reconciliation workflow
///
/// Events represent facts about things that have already happened.
/// They are emitted after the corresponding write has been committed,
/// so subscribers never observe a state the store does not hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LeagueEvent {
    /// A race's result sheet was replaced and the race marked completed
    ResultsRecorded {
        race_id: RaceId,
        season_id: SeasonId,
        entries: usize,
    },

    /// A race with no recorded results was deleted
    RaceDeleted { race_id: RaceId },

    /// A penalty was issued against a driver
    PenaltyApplied {
        penalty_id: PenaltyId,
        driver_id: DriverId,
        race_id: Option<RaceId>,
        penalty_type: String,
    },

    /// A penalty was removed and its effect reversed
    PenaltyRemoved {
        penalty_id: PenaltyId,
        driver_id: DriverId,
        race_id: Option<RaceId>,
    },
}

impl LeagueEvent {
    /// Short tag used in log lines.
    pub fn event_type(&self) -> &'static str {
        match self {
            LeagueEvent::ResultsRecorded { .. } => "results_recorded",
            LeagueEvent::RaceDeleted { .. } => "race_deleted",
            LeagueEvent::PenaltyApplied { .. } => "penalty_applied",
            LeagueEvent::PenaltyRemoved { .. } => "penalty_removed",
        }
    }
}
